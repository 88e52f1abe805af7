//! Component composition
//!
//! [`Bridge`] owns one of each state machine and the frame store and
//! exposes one entry point per trigger source. An interrupt-driven port
//! calls each entry point from the matching handler; an async port calls
//! them from tasks, holding the bridge in a critical-section mutex.
//!
//! | Trigger                  | Entry point            |
//! |--------------------------|------------------------|
//! | break sampling tick      | [`Bridge::on_break_tick`] |
//! | UART byte received       | [`Bridge::on_rx_byte`]    |
//! | UART line error          | [`Bridge::on_rx_error`]   |
//! | UART break condition     | [`Bridge::on_rx_break`]   |
//! | background loop          | [`Bridge::poll_mainline`] |
//! | MPX timer expiry         | [`Bridge::on_mpx_timer`]  |
//! | two-wire completion      | [`Bridge::on_dac_complete`] |
//! | status period            | [`Bridge::on_status_period`] |

use crate::config::{BridgeConfig, ConfigError, DAC_WRITE_ADDRESS};
use crate::dac::{DacLink, DacPhase, DacSample, RequestOutcome};
use crate::dmx::{
    BreakDetector, BreakEvent, FrameOutcome, FrameReady, FrameReceiver, FrameStats, LineError,
    Reframer, RxEvent,
};
use crate::frame::{FrameBank, FrameStore};
use crate::mpx::{MpxGenerator, MpxStep};
use crate::status::{Lamps, LinkSupervisor};
use crate::traits::TwoWireBus;

/// Result of one MPX timer expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpxTick<E> {
    /// Emitted step; reload the timer with `step.hold_us`
    pub step: MpxStep,
    /// What happened to the sample at the DAC
    pub dac: Result<RequestOutcome, E>,
}

/// The complete bridge
pub struct Bridge<B> {
    detector: BreakDetector,
    receiver: FrameReceiver,
    ready: FrameReady,
    reframer: Reframer,
    store: FrameStore,
    generator: MpxGenerator,
    dac: DacLink<B>,
    supervisor: LinkSupervisor,
    /// Bytes seen on the line during the current status period
    line_bytes: u32,
}

impl<B: TwoWireBus> Bridge<B> {
    /// Build a bridge with break detection armed and the scan at channel 1
    pub fn new(config: BridgeConfig, bus: B) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector: BreakDetector::new(config.break_timing),
            receiver: FrameReceiver::new(&config),
            ready: FrameReady::new(),
            reframer: Reframer::new(config),
            store: FrameStore::new(),
            generator: MpxGenerator::new(config.mpx_timing),
            dac: DacLink::new(bus, DAC_WRITE_ADDRESS),
            supervisor: LinkSupervisor::new(),
            line_bytes: 0,
        })
    }

    /// Drive the analog output to the sync level (power-up state)
    pub fn park_output(&mut self) -> Result<RequestOutcome, B::Error> {
        self.dac.request(DacSample::SYNC)
    }

    /// Break sampling tick
    ///
    /// On [`BreakEvent::HandOff`] the receiver is enabled and the caller
    /// should stop the tick source until [`Bridge::is_break_armed`] is true
    /// again. Line errors the UART still reports for the break itself (they
    /// arrive before the start code) are cleared by the receiver.
    pub fn on_break_tick(&mut self, line_idle: bool) -> BreakEvent {
        let event = self.detector.tick(line_idle);
        if event == BreakEvent::HandOff {
            self.receiver.enable();
        }
        event
    }

    pub fn is_break_armed(&self) -> bool {
        self.detector.is_armed()
    }

    /// UART received byte
    pub fn on_rx_byte(&mut self, byte: u8) -> RxEvent {
        self.line_bytes = self.line_bytes.saturating_add(1);
        let event = self.receiver.on_byte(byte, self.store.back_mut());
        self.handle_rx(event)
    }

    /// UART line error
    pub fn on_rx_error(&mut self, error: LineError) -> RxEvent {
        let event = self.receiver.on_error(error);
        self.handle_rx(event)
    }

    /// UART break condition (line held low for a whole character)
    pub fn on_rx_break(&mut self) -> RxEvent {
        let event = self.receiver.on_break();
        self.handle_rx(event)
    }

    fn handle_rx(&mut self, event: RxEvent) -> RxEvent {
        match event {
            RxEvent::Stored | RxEvent::Finished(FrameOutcome::Complete) => {
                self.supervisor.note_activity();
            }
            RxEvent::Finished(FrameOutcome::Aborted(_)) | RxEvent::ErrorNoted(_) => {
                self.supervisor.note_line_error();
            }
            RxEvent::Finished(FrameOutcome::Ignored { .. })
            | RxEvent::Cleared(_)
            | RxEvent::Skipped
            | RxEvent::Disabled => {}
        }
        if let RxEvent::Finished(outcome) = event {
            self.ready.raise(outcome);
        }
        event
    }

    /// Whether a finished attempt is waiting for the mainline loop
    pub fn frame_ready(&self) -> bool {
        self.ready.is_raised()
    }

    /// Mainline reframe loop body
    ///
    /// Returns the outcome serviced, or `None` if frame-ready was not set.
    pub fn poll_mainline(&mut self) -> Option<FrameOutcome> {
        let serviced = self.reframer.service(
            &mut self.ready,
            &mut self.receiver,
            &mut self.detector,
            &mut self.store,
        )?;
        if let Some(config) = serviced.applied {
            self.generator.set_timing(config.mpx_timing);
        }
        Some(serviced.outcome)
    }

    /// Queue a configuration change for the next re-arm
    pub fn stage_config(&mut self, config: BridgeConfig) -> Result<(), ConfigError> {
        self.reframer.stage_config(config)
    }

    /// MPX timer expiry
    pub fn on_mpx_timer(&mut self) -> MpxTick<B::Error> {
        let step = self.generator.step(self.store.front());
        let dac = self.dac.request(step.sample);
        MpxTick { step, dac }
    }

    /// Two-wire bus completion
    pub fn on_dac_complete(&mut self) -> Result<DacPhase, B::Error> {
        self.dac.on_complete()
    }

    /// Status period elapsed
    pub fn on_status_period(&mut self) -> Lamps {
        let idle = self.line_bytes == 0;
        self.line_bytes = 0;
        self.supervisor.on_period(idle)
    }

    pub fn lamps(&self) -> Lamps {
        self.supervisor.lamps()
    }

    /// Frame the generator is currently reading
    pub fn front(&self) -> &FrameBank {
        self.store.front()
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn receiver(&self) -> &FrameReceiver {
        &self.receiver
    }

    pub fn detector(&self) -> &BreakDetector {
        &self.detector
    }

    pub fn generator(&self) -> &MpxGenerator {
        &self.generator
    }

    pub fn dac(&self) -> &DacLink<B> {
        &self.dac
    }

    pub fn dac_mut(&mut self) -> &mut DacLink<B> {
        &mut self.dac
    }

    pub fn config(&self) -> &BridgeConfig {
        self.reframer.config()
    }

    pub fn stats(&self) -> FrameStats {
        self.reframer.stats()
    }
}
