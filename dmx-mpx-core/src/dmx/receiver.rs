//! DMX slot capture
//!
//! Fires once per received byte after the break detector hands off the
//! line. Slot 0 (the start code) is always stored, the next
//! `start_address` slots are skipped, and the following `channel_count`
//! slots are stored in order. When the last one lands, reception is
//! disabled and the attempt is reported as finished; only the mainline
//! reframe loop enables it again.
//!
//! Line errors reported before the start code still belong to the break
//! that opened the frame and are cleared, not acted on.

use crate::config::{BridgeConfig, LineErrorPolicy};
use crate::frame::FrameBank;

use super::NULL_START_CODE;

/// Receive line errors reported by the UART
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Receiver could not keep up, a byte was lost
    Overrun,
    /// Missing stop bit (also reported for an unexpected break)
    Framing,
    /// Parity mismatch
    Parity,
}

/// How a frame attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameOutcome {
    /// Every configured slot was captured
    Complete,
    /// Abandoned on a line error; the back bank is partial
    Aborted(LineError),
    /// Alternate start code (e.g. RDM) rejected
    Ignored { start_code: u8 },
}

/// Result of feeding the receiver one byte or error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// Reception is disabled; the input was dropped
    Disabled,
    /// Byte fell inside the start address window
    Skipped,
    /// Slot stored; the link is carrying data
    Stored,
    /// Attempt over: raise frame-ready with this outcome
    Finished(FrameOutcome),
    /// Error noted without ending the attempt (clear the activity lamp)
    ErrorNoted(LineError),
    /// Error left pending from the break itself, dropped at hand-off
    Cleared(LineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Disabled,
    Receiving,
    Done,
}

/// Frame receiver state
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    state: RxState,
    start_address: u16,
    channel_count: u16,
    null_start_only: bool,
    error_policy: LineErrorPolicy,
    /// Bytes seen since the break, start code included
    bytes_since_break: u16,
    /// Slots skipped for the start address
    address_skip_count: u16,
    /// Slots stored, start code included
    received_count: u16,
}

impl FrameReceiver {
    /// Create a disabled receiver for the given configuration
    pub fn new(config: &BridgeConfig) -> Self {
        let mut rx = Self {
            state: RxState::Disabled,
            start_address: 0,
            channel_count: 0,
            null_start_only: true,
            error_policy: LineErrorPolicy::ResyncAll,
            bytes_since_break: 0,
            address_skip_count: 0,
            received_count: 0,
        };
        rx.configure(config);
        rx
    }

    /// Apply a new channel window and policies (use between frames)
    pub fn configure(&mut self, config: &BridgeConfig) {
        self.start_address = config.start_address;
        self.channel_count = config.channel_count;
        self.null_start_only = config.null_start_only;
        self.error_policy = config.error_policy;
    }

    /// Enable byte reception (hand-off from the break detector)
    pub fn enable(&mut self) {
        if self.state == RxState::Disabled {
            self.state = RxState::Receiving;
        }
    }

    /// Reset the reception cursor and disable reception
    pub fn reset(&mut self) {
        self.state = RxState::Disabled;
        self.bytes_since_break = 0;
        self.address_skip_count = 0;
        self.received_count = 0;
    }

    /// Process one received byte, storing into `bank`
    pub fn on_byte(&mut self, byte: u8, bank: &mut FrameBank) -> RxEvent {
        if self.state != RxState::Receiving {
            return RxEvent::Disabled;
        }

        self.bytes_since_break = self.bytes_since_break.saturating_add(1);

        if self.bytes_since_break == 1 {
            bank.set_slot(0, byte);
            self.received_count = 1;

            if self.null_start_only && byte != NULL_START_CODE {
                return self.finish(FrameOutcome::Ignored { start_code: byte });
            }
            if self.channel_count == 0 {
                return self.finish(FrameOutcome::Complete);
            }
            return RxEvent::Stored;
        }

        if self.address_skip_count < self.start_address {
            self.address_skip_count += 1;
            return RxEvent::Skipped;
        }

        bank.set_slot(self.received_count as usize, byte);
        self.received_count += 1;

        if self.received_count == self.channel_count + 1 {
            self.finish(FrameOutcome::Complete)
        } else {
            RxEvent::Stored
        }
    }

    /// Process a line error reported by the UART
    pub fn on_error(&mut self, error: LineError) -> RxEvent {
        if self.state != RxState::Receiving {
            return RxEvent::Disabled;
        }

        // Anything reported before the start code belongs to the break
        if self.bytes_since_break == 0 {
            return RxEvent::Cleared(error);
        }

        match (self.error_policy, error) {
            (_, LineError::Overrun) | (LineErrorPolicy::ResyncAll, _) => {
                self.finish(FrameOutcome::Aborted(error))
            }
            (LineErrorPolicy::OverrunOnly, _) => RxEvent::ErrorNoted(error),
        }
    }

    /// Process a break condition reported by the UART
    ///
    /// Before the start code this is the break that opened the frame. After
    /// it, the frame was shorter than the window and the attempt ends under
    /// either error policy; otherwise the next frame's bytes would be stored
    /// as channel data.
    pub fn on_break(&mut self) -> RxEvent {
        if self.state != RxState::Receiving {
            return RxEvent::Disabled;
        }
        if self.bytes_since_break == 0 {
            return RxEvent::Cleared(LineError::Framing);
        }
        self.finish(FrameOutcome::Aborted(LineError::Framing))
    }

    fn finish(&mut self, outcome: FrameOutcome) -> RxEvent {
        self.state = RxState::Done;
        RxEvent::Finished(outcome)
    }

    /// Whether bytes are currently being accepted
    pub fn is_receiving(&self) -> bool {
        self.state == RxState::Receiving
    }

    /// Slots stored in the current attempt, start code included
    pub fn received_count(&self) -> u16 {
        self.received_count
    }

    /// Slots skipped for the start address in the current attempt
    pub fn address_skip_count(&self) -> u16 {
        self.address_skip_count
    }

    /// Configured channel count
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_CHANNELS;

    fn receiver(start_address: u16, channel_count: u16) -> FrameReceiver {
        let config = BridgeConfig::with_window(start_address, channel_count).unwrap();
        let mut rx = FrameReceiver::new(&config);
        rx.enable();
        rx
    }

    /// Feed bytes and return the last event
    fn feed(rx: &mut FrameReceiver, bank: &mut FrameBank, bytes: &[u8]) -> RxEvent {
        let mut last = RxEvent::Disabled;
        for &b in bytes {
            last = rx.on_byte(b, bank);
        }
        last
    }

    #[test]
    fn test_disabled_until_enabled() {
        let config = BridgeConfig::default();
        let mut rx = FrameReceiver::new(&config);
        let mut bank = FrameBank::new();
        assert_eq!(rx.on_byte(0, &mut bank), RxEvent::Disabled);
        assert_eq!(rx.on_error(LineError::Overrun), RxEvent::Disabled);
        assert_eq!(rx.received_count(), 0);
    }

    #[test]
    fn test_captures_window_from_start() {
        let mut rx = receiver(0, 4);
        let mut bank = FrameBank::new();

        assert_eq!(rx.on_byte(0, &mut bank), RxEvent::Stored);
        assert_eq!(feed(&mut rx, &mut bank, &[1, 2, 3]), RxEvent::Stored);
        assert_eq!(
            rx.on_byte(4, &mut bank),
            RxEvent::Finished(FrameOutcome::Complete)
        );
        assert_eq!(rx.received_count(), 5);
        assert_eq!(&bank.levels()[..4], &[1, 2, 3, 4]);

        // Reception disabled after completion
        assert_eq!(rx.on_byte(9, &mut bank), RxEvent::Disabled);
        assert_eq!(rx.received_count(), 5);
    }

    #[test]
    fn test_start_address_skips_slots() {
        let mut rx = receiver(3, 2);
        let mut bank = FrameBank::new();

        assert_eq!(rx.on_byte(0, &mut bank), RxEvent::Stored);
        assert_eq!(rx.on_byte(11, &mut bank), RxEvent::Skipped);
        assert_eq!(rx.on_byte(12, &mut bank), RxEvent::Skipped);
        assert_eq!(rx.on_byte(13, &mut bank), RxEvent::Skipped);
        assert_eq!(rx.address_skip_count(), 3);
        assert_eq!(rx.on_byte(14, &mut bank), RxEvent::Stored);
        assert_eq!(
            rx.on_byte(15, &mut bank),
            RxEvent::Finished(FrameOutcome::Complete)
        );
        assert_eq!(bank.slot(1), Some(14));
        assert_eq!(bank.slot(2), Some(15));
    }

    #[test]
    fn test_zero_channels_completes_on_start_code() {
        let mut rx = receiver(0, 0);
        let mut bank = FrameBank::new();
        assert_eq!(
            rx.on_byte(0, &mut bank),
            RxEvent::Finished(FrameOutcome::Complete)
        );
    }

    #[test]
    fn test_alternate_start_code_ignored() {
        let mut rx = receiver(0, 4);
        let mut bank = FrameBank::new();
        assert_eq!(
            rx.on_byte(0xCC, &mut bank),
            RxEvent::Finished(FrameOutcome::Ignored { start_code: 0xCC })
        );
        assert_eq!(rx.on_byte(1, &mut bank), RxEvent::Disabled);
    }

    #[test]
    fn test_alternate_start_code_accepted_when_allowed() {
        let config = BridgeConfig {
            null_start_only: false,
            channel_count: 1,
            ..BridgeConfig::default()
        };
        let mut rx = FrameReceiver::new(&config);
        rx.enable();
        let mut bank = FrameBank::new();
        assert_eq!(rx.on_byte(0x17, &mut bank), RxEvent::Stored);
        assert_eq!(
            rx.on_byte(42, &mut bank),
            RxEvent::Finished(FrameOutcome::Complete)
        );
        assert_eq!(bank.start_code(), 0x17);
    }

    #[test]
    fn test_errors_abort_under_resync_all() {
        for err in [LineError::Overrun, LineError::Framing, LineError::Parity] {
            let mut rx = receiver(0, 8);
            let mut bank = FrameBank::new();
            feed(&mut rx, &mut bank, &[0, 1, 2]);
            assert_eq!(
                rx.on_error(err),
                RxEvent::Finished(FrameOutcome::Aborted(err))
            );
            assert!(!rx.is_receiving());
        }
    }

    #[test]
    fn test_errors_before_start_code_are_cleared() {
        for err in [LineError::Overrun, LineError::Framing, LineError::Parity] {
            let mut rx = receiver(0, 2);
            let mut bank = FrameBank::new();
            assert_eq!(rx.on_error(err), RxEvent::Cleared(err));
            assert!(rx.is_receiving());
            assert_eq!(rx.on_byte(0, &mut bank), RxEvent::Stored);
            assert_eq!(rx.on_byte(5, &mut bank), RxEvent::Stored);
            assert_eq!(
                rx.on_byte(6, &mut bank),
                RxEvent::Finished(FrameOutcome::Complete)
            );
        }
    }

    #[test]
    fn test_break_before_start_code_is_cleared() {
        let mut rx = receiver(0, 2);
        let mut bank = FrameBank::new();
        assert_eq!(rx.on_break(), RxEvent::Cleared(LineError::Framing));
        assert!(rx.is_receiving());
        assert_eq!(rx.on_byte(0, &mut bank), RxEvent::Stored);
    }

    #[test]
    fn test_break_mid_frame_aborts_under_either_policy() {
        for policy in [LineErrorPolicy::ResyncAll, LineErrorPolicy::OverrunOnly] {
            let config = BridgeConfig {
                error_policy: policy,
                channel_count: 4,
                ..BridgeConfig::default()
            };
            let mut rx = FrameReceiver::new(&config);
            rx.enable();
            let mut bank = FrameBank::new();
            feed(&mut rx, &mut bank, &[0, 1]);
            assert_eq!(
                rx.on_break(),
                RxEvent::Finished(FrameOutcome::Aborted(LineError::Framing))
            );
            assert_eq!(rx.on_byte(0, &mut bank), RxEvent::Disabled);
        }
    }

    #[test]
    fn test_overrun_only_policy_keeps_receiving() {
        let config = BridgeConfig {
            error_policy: LineErrorPolicy::OverrunOnly,
            channel_count: 2,
            ..BridgeConfig::default()
        };
        let mut rx = FrameReceiver::new(&config);
        rx.enable();
        let mut bank = FrameBank::new();

        rx.on_byte(0, &mut bank);
        assert_eq!(
            rx.on_error(LineError::Framing),
            RxEvent::ErrorNoted(LineError::Framing)
        );
        assert_eq!(
            rx.on_error(LineError::Parity),
            RxEvent::ErrorNoted(LineError::Parity)
        );
        assert!(rx.is_receiving());
        assert_eq!(
            rx.on_error(LineError::Overrun),
            RxEvent::Finished(FrameOutcome::Aborted(LineError::Overrun))
        );
    }

    #[test]
    fn test_reset_rewinds_cursor() {
        let mut rx = receiver(2, 4);
        let mut bank = FrameBank::new();
        feed(&mut rx, &mut bank, &[0, 1, 2, 3]);
        assert_eq!(rx.received_count(), 2);

        rx.reset();
        assert_eq!(rx.received_count(), 0);
        assert_eq!(rx.address_skip_count(), 0);
        assert!(!rx.is_receiving());

        rx.enable();
        assert_eq!(rx.on_byte(0, &mut bank), RxEvent::Stored);
        assert_eq!(rx.on_byte(7, &mut bank), RxEvent::Skipped);
    }

    #[test]
    fn test_full_variant_window() {
        let mut rx = receiver(0, MAX_CHANNELS as u16);
        let mut bank = FrameBank::new();
        rx.on_byte(0, &mut bank);
        let mut last = RxEvent::Disabled;
        for i in 0..MAX_CHANNELS {
            last = rx.on_byte(i as u8 + 1, &mut bank);
        }
        assert_eq!(last, RxEvent::Finished(FrameOutcome::Complete));
        assert_eq!(bank.slot(MAX_CHANNELS), Some(MAX_CHANNELS as u8));
    }
}
