//! Break detection
//!
//! Samples the receive line on a fast fixed tick. A break is confirmed only
//! after `threshold_ticks` consecutive idle (low) samples; any active
//! sample before that restarts the count. Once confirmed, the first active
//! sample (the mark after break) hands the line over to the receiver.

use crate::config::BreakTiming;

/// Result of one sampling tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BreakEvent {
    /// Nothing to report
    None,
    /// The idle run just reached the threshold
    Confirmed,
    /// Mark after a confirmed break: stop ticking, clear pending receive
    /// errors and enable the frame receiver
    HandOff,
}

/// Break detector state
#[derive(Debug, Clone)]
pub struct BreakDetector {
    threshold: u16,
    idle_run_length: u16,
    break_confirmed: bool,
    armed: bool,
}

impl BreakDetector {
    /// Create an armed detector
    pub fn new(timing: BreakTiming) -> Self {
        Self {
            threshold: timing.threshold_ticks.max(1),
            idle_run_length: 0,
            break_confirmed: false,
            armed: true,
        }
    }

    /// Process one sample of the receive line
    ///
    /// `line_idle` is true while the line sits at the break (low) level.
    pub fn tick(&mut self, line_idle: bool) -> BreakEvent {
        if !self.armed {
            return BreakEvent::None;
        }

        match (line_idle, self.break_confirmed) {
            (false, false) => {
                self.idle_run_length = 0;
                BreakEvent::None
            }
            (false, true) => {
                self.armed = false;
                BreakEvent::HandOff
            }
            (true, confirmed) => {
                self.idle_run_length = self.idle_run_length.saturating_add(1);
                if !confirmed && self.idle_run_length >= self.threshold {
                    self.break_confirmed = true;
                    BreakEvent::Confirmed
                } else {
                    BreakEvent::None
                }
            }
        }
    }

    /// Reset the counters and resume sampling
    pub fn rearm(&mut self) {
        self.idle_run_length = 0;
        self.break_confirmed = false;
        self.armed = true;
    }

    /// Apply new timing (takes effect immediately, use between frames)
    pub fn set_timing(&mut self, timing: BreakTiming) {
        self.threshold = timing.threshold_ticks.max(1);
    }

    /// Whether the tick source should be running
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether a break has been confirmed in this cycle
    pub fn break_confirmed(&self) -> bool {
        self.break_confirmed
    }

    /// Consecutive idle samples seen so far
    pub fn idle_run_length(&self) -> u16 {
        self.idle_run_length
    }
}
