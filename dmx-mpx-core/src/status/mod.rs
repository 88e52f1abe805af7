//! Status lamps
//!
//! Heartbeat and DMX activity indication. Purely informational; nothing
//! here gates the data path.

pub mod supervisor;

pub use supervisor::{Lamps, LinkSupervisor, IDLE_PERIODS_BEFORE_CLEAR};
