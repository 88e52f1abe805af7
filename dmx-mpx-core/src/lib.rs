//! Board-agnostic core logic for the DMX512 to analog MPX bridge
//!
//! This crate contains every timing-critical state machine of the bridge,
//! expressed as owned structs with pure transition functions. Hardware
//! access stays at the boundary: triggers (timer ticks, received bytes,
//! bus completions) are calls into these types.
//!
//! ```text
//! break tick ─▶ BreakDetector ─▶ FrameReceiver ─▶ FrameStore (back bank)
//!                                      │                 │ publish
//!                                 FrameReady             ▼
//!                                      │          FrameStore (front bank)
//!                                  Reframer              │
//!                                                        ▼
//!                      MPX timer ─▶ MpxGenerator ─▶ DacLink ─▶ two-wire DAC
//! ```
//!
//! - DMX reception (break detection, slot capture, reframing)
//! - Double-buffered frame store
//! - Analog multiplex scan generation
//! - DAC transaction sequencing
//! - Link activity supervision
//! - Configuration types and parsing

#![no_std]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod dac;
pub mod dmx;
pub mod frame;
pub mod mpx;
pub mod status;
pub mod traits;

pub use bridge::Bridge;
pub use config::{BridgeConfig, MAX_CHANNELS};
