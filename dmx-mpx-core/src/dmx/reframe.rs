//! Mainline reframe loop
//!
//! The only place that restarts frame acquisition. Runs outside the
//! trigger handlers: takes the one-shot frame-ready flag, publishes a
//! complete frame, applies any staged configuration and re-arms the
//! break detector.

use crate::config::{BridgeConfig, ConfigError};
use crate::frame::FrameStore;

use super::break_detect::BreakDetector;
use super::receiver::{FrameOutcome, FrameReceiver};

/// One-shot "frame attempt finished" flag
///
/// Raised by the receive path, taken (read and cleared in one step) by
/// the mainline loop.
#[derive(Debug, Clone, Default)]
pub struct FrameReady {
    outcome: Option<FrameOutcome>,
}

impl FrameReady {
    pub const fn new() -> Self {
        Self { outcome: None }
    }

    /// Raise the flag with the attempt's outcome
    pub fn raise(&mut self, outcome: FrameOutcome) {
        self.outcome = Some(outcome);
    }

    pub fn is_raised(&self) -> bool {
        self.outcome.is_some()
    }

    /// Read and clear
    pub fn take(&mut self) -> Option<FrameOutcome> {
        self.outcome.take()
    }
}

/// Frame attempt counters (wrap on overflow)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    pub completed: u32,
    pub aborted: u32,
    pub ignored: u32,
}

impl FrameStats {
    fn record(&mut self, outcome: FrameOutcome) {
        let counter = match outcome {
            FrameOutcome::Complete => &mut self.completed,
            FrameOutcome::Aborted(_) => &mut self.aborted,
            FrameOutcome::Ignored { .. } => &mut self.ignored,
        };
        *counter = counter.wrapping_add(1);
    }
}

/// What one pass of the mainline loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Serviced {
    pub outcome: FrameOutcome,
    /// Configuration that took effect at this re-arm, if one was staged
    pub applied: Option<BridgeConfig>,
}

/// Mainline reframe state
#[derive(Debug, Clone)]
pub struct Reframer {
    active: BridgeConfig,
    staged: Option<BridgeConfig>,
    stats: FrameStats,
}

impl Reframer {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            active: config,
            staged: None,
            stats: FrameStats::default(),
        }
    }

    /// Queue a configuration change for the next re-arm
    ///
    /// Rejected configurations leave the staged one untouched.
    pub fn stage_config(&mut self, config: BridgeConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.staged = Some(config);
        Ok(())
    }

    /// Configuration the current attempt runs under
    pub fn config(&self) -> &BridgeConfig {
        &self.active
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Service the frame-ready flag
    ///
    /// Returns `None` if the flag was not raised (nothing is touched in
    /// that case).
    pub fn service(
        &mut self,
        ready: &mut FrameReady,
        receiver: &mut FrameReceiver,
        detector: &mut BreakDetector,
        store: &mut FrameStore,
    ) -> Option<Serviced> {
        let outcome = ready.take()?;
        let applied = self.rearm(outcome, receiver, detector, store);
        Some(Serviced { outcome, applied })
    }

    /// Finish an attempt and restart acquisition
    ///
    /// Returns the newly applied configuration if one was staged.
    fn rearm(
        &mut self,
        outcome: FrameOutcome,
        receiver: &mut FrameReceiver,
        detector: &mut BreakDetector,
        store: &mut FrameStore,
    ) -> Option<BridgeConfig> {
        self.stats.record(outcome);
        if outcome == FrameOutcome::Complete {
            store.publish();
        }

        let applied = self.staged.take();
        if let Some(config) = applied {
            self.active = config;
            receiver.configure(&config);
            detector.set_timing(config.break_timing);
        }

        store.back_mut().clear_above(self.active.channel_count as usize);
        receiver.reset();
        detector.rearm();
        applied
    }
}
