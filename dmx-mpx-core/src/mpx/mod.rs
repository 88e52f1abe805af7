//! Analog multiplex (MPX) scan generation
//!
//! A free-running cycle that walks the front frame bank and emits one
//! level pulse per output channel separated by short sync pulses, closed
//! by a long sync pulse. The scan never waits for new frames.

pub mod generator;

pub use generator::{MpxGenerator, MpxPhase, MpxStep};
