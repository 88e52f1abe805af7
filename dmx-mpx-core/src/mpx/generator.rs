//! MPX scan state machine
//!
//! Waveform for one scan (`N = MAX_CHANNELS`):
//!
//! ```text
//! L1 | S | L2 | S | ... | S | LN | long S
//! ```
//!
//! Each step emits one DAC sample and says how long the timer must hold
//! it before the next step.

use crate::config::{MpxTiming, MAX_CHANNELS};
use crate::dac::{encode_level, DacSample};
use crate::frame::FrameBank;

/// Phase executed by the next timer expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MpxPhase {
    /// First channel of a scan
    EmitFirstLevel,
    /// Short sync between two channels
    EmitSync,
    /// Any later channel; the last one leads to the long sync
    EmitNextLevel,
    /// Reset pulse closing the scan
    EmitLongSync,
}

/// Output of one generator step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MpxStep {
    /// Phase that produced this step
    pub phase: MpxPhase,
    /// Sample to send to the DAC
    pub sample: DacSample,
    /// Time until the next step (us)
    pub hold_us: u32,
}

/// MPX generator state
#[derive(Debug, Clone)]
pub struct MpxGenerator {
    timing: MpxTiming,
    phase: MpxPhase,
    /// Next output channel, `1..=MAX_CHANNELS`
    output_channel_index: usize,
}

impl MpxGenerator {
    pub fn new(timing: MpxTiming) -> Self {
        Self {
            timing,
            phase: MpxPhase::EmitFirstLevel,
            output_channel_index: 1,
        }
    }

    /// Apply new pulse widths from the next step on
    pub fn set_timing(&mut self, timing: MpxTiming) {
        self.timing = timing;
    }

    /// Phase of the next step
    pub fn phase(&self) -> MpxPhase {
        self.phase
    }

    /// Channel the next level pulse will carry
    pub fn output_channel_index(&self) -> usize {
        self.output_channel_index
    }

    /// Duration of one full scan (us), saturating for unvalidated timing
    pub fn scan_period_us(&self) -> u32 {
        let t = &self.timing;
        (MAX_CHANNELS as u32 - 1)
            .saturating_mul(t.level_pulse_us.saturating_add(t.sync_pulse_us))
            .saturating_add(t.level_pulse_us)
            .saturating_add(t.long_sync_us)
    }

    /// Advance one phase, reading levels from `frame`
    pub fn step(&mut self, frame: &FrameBank) -> MpxStep {
        let phase = self.phase;
        let (sample, hold_us) = match phase {
            MpxPhase::EmitFirstLevel => {
                self.output_channel_index = 1;
                let sample = self.level_of(frame);
                self.output_channel_index = 2.min(MAX_CHANNELS);
                self.phase = if MAX_CHANNELS > 1 {
                    MpxPhase::EmitSync
                } else {
                    MpxPhase::EmitLongSync
                };
                (sample, self.timing.level_pulse_us)
            }
            MpxPhase::EmitSync => {
                self.phase = MpxPhase::EmitNextLevel;
                (DacSample::SYNC, self.timing.sync_pulse_us)
            }
            MpxPhase::EmitNextLevel => {
                let sample = self.level_of(frame);
                if self.output_channel_index < MAX_CHANNELS {
                    self.output_channel_index += 1;
                    self.phase = MpxPhase::EmitSync;
                } else {
                    self.output_channel_index = 1;
                    self.phase = MpxPhase::EmitLongSync;
                }
                (sample, self.timing.level_pulse_us)
            }
            MpxPhase::EmitLongSync => {
                self.phase = MpxPhase::EmitFirstLevel;
                (DacSample::SYNC, self.timing.long_sync_us)
            }
        };

        MpxStep {
            phase,
            sample,
            hold_us,
        }
    }

    fn level_of(&self, frame: &FrameBank) -> DacSample {
        encode_level(frame.slot(self.output_channel_index).unwrap_or(0))
    }
}
