//! Hardware abstraction traits
//!
//! These traits define the interface between the state machines and the
//! chip-specific peripherals.

pub mod bus;

pub use bus::TwoWireBus;
