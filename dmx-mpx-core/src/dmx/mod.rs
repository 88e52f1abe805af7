//! DMX512 reception
//!
//! Break detection from line timing, slot capture into the frame store,
//! and the mainline loop that re-arms acquisition after each frame.

pub mod break_detect;
pub mod receiver;
pub mod reframe;

pub use break_detect::{BreakDetector, BreakEvent};
pub use receiver::{FrameOutcome, FrameReceiver, LineError, RxEvent};
pub use reframe::{FrameReady, FrameStats, Reframer, Serviced};

/// Start code of a dimmer-level frame
pub const NULL_START_CODE: u8 = 0x00;
