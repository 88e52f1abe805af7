//! Bridge configuration
//!
//! The configuration is owned by the front panel (or the embedded
//! `bridge.toml` defaults) and is read-only to the state machines.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::{
    BreakTiming, BridgeConfig, ConfigError, LineErrorPolicy, MpxTiming, DAC_WRITE_ADDRESS,
    DMX_BAUDRATE, DMX_MAX_SLOTS, MAX_BREAK_THRESHOLD_US, MAX_CHANNELS, MAX_PULSE_US,
    STATUS_PERIOD_MS,
};
