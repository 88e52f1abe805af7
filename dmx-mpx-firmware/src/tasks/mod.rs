//! Embassy async tasks
//!
//! Each task stands in for one interrupt source of the bridge and calls the
//! matching `Bridge` entry point.

pub mod break_detect;
pub mod dac;
pub mod dmx_rx;
pub mod mpx;
pub mod status;

pub use break_detect::{break_task, RxLineProbe};
pub use dac::dac_task;
pub use dmx_rx::dmx_rx_task;
pub use mpx::mpx_task;
pub use status::status_task;
