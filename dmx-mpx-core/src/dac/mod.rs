//! Two-wire DAC output
//!
//! 10-bit samples, the byte-level transaction state machine, and the link
//! that executes it on a [`TwoWireBus`](crate::traits::TwoWireBus).

pub mod link;
pub mod sample;
pub mod transaction;

pub use link::{DacLink, RequestOutcome};
pub use sample::{encode_level, DacSample};
pub use transaction::{BusOp, DacPhase, DacTransaction};
