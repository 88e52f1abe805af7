//! DAC write transaction state machine
//!
//! One transaction per sample:
//!
//! ```text
//! Idle ─request─▶ Starting ─▶ AddressSent ─▶ HighSent ─▶ LowSent ─▶ StopRequested ─▶ Idle
//!        (start)       (addr+W)     (D9..D6)    (D5..D0)    (stop)
//! ```
//!
//! Each arrow after `request` is one bus completion. A request made while a
//! transaction is in flight is dropped: the latched sample and the bytes
//! still to be sent are never disturbed, and nothing is queued.

use super::sample::DacSample;

/// Bus action to issue next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusOp {
    Start,
    Write(u8),
    Stop,
}

/// Transaction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacPhase {
    Idle,
    /// Start condition issued
    Starting,
    /// Address + write byte issued
    AddressSent,
    /// High data byte issued
    HighSent,
    /// Low data byte issued
    LowSent,
    /// Stop condition issued
    StopRequested,
}

/// DAC transaction state
#[derive(Debug, Clone)]
pub struct DacTransaction {
    address: u8,
    phase: DacPhase,
    pending: DacSample,
}

impl DacTransaction {
    /// Create an idle transaction for the DAC at `address` (address + W byte)
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            phase: DacPhase::Idle,
            pending: DacSample::SYNC,
        }
    }

    pub fn phase(&self) -> DacPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == DacPhase::Idle
    }

    /// Sample latched by the last accepted request
    pub fn pending(&self) -> DacSample {
        self.pending
    }

    /// Request transmission of `sample`
    ///
    /// Returns the first bus action if accepted, `None` if busy.
    pub fn request(&mut self, sample: DacSample) -> Option<BusOp> {
        if self.phase != DacPhase::Idle {
            return None;
        }
        self.pending = sample;
        self.phase = DacPhase::Starting;
        Some(BusOp::Start)
    }

    /// Advance on a bus completion signal
    ///
    /// Returns the next bus action, or `None` once back at idle. A
    /// completion while idle is spurious and ignored.
    pub fn on_complete(&mut self) -> Option<BusOp> {
        let (next, op) = match self.phase {
            DacPhase::Idle => return None,
            DacPhase::Starting => (DacPhase::AddressSent, Some(BusOp::Write(self.address))),
            DacPhase::AddressSent => (
                DacPhase::HighSent,
                Some(BusOp::Write(self.pending.high_byte())),
            ),
            DacPhase::HighSent => (
                DacPhase::LowSent,
                Some(BusOp::Write(self.pending.low_byte())),
            ),
            DacPhase::LowSent => (DacPhase::StopRequested, Some(BusOp::Stop)),
            DacPhase::StopRequested => (DacPhase::Idle, None),
        };
        self.phase = next;
        op
    }

    /// Abandon the transaction (bus fault)
    pub fn abort(&mut self) {
        self.phase = DacPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DAC_WRITE_ADDRESS;

    #[test]
    fn test_full_sequence() {
        let mut tx = DacTransaction::new(DAC_WRITE_ADDRESS);
        let sample = DacSample::new(0x3FE);

        assert_eq!(tx.request(sample), Some(BusOp::Start));
        assert_eq!(tx.phase(), DacPhase::Starting);
        assert_eq!(tx.on_complete(), Some(BusOp::Write(DAC_WRITE_ADDRESS)));
        assert_eq!(tx.on_complete(), Some(BusOp::Write(0x0F)));
        assert_eq!(tx.on_complete(), Some(BusOp::Write(0xF8)));
        assert_eq!(tx.on_complete(), Some(BusOp::Stop));
        assert_eq!(tx.phase(), DacPhase::StopRequested);
        assert_eq!(tx.on_complete(), None);
        assert!(tx.is_idle());
    }

    #[test]
    fn test_busy_request_dropped() {
        let mut tx = DacTransaction::new(DAC_WRITE_ADDRESS);
        tx.request(DacSample::new(600));
        tx.on_complete();

        assert_eq!(tx.request(DacSample::new(100)), None);
        assert_eq!(tx.pending(), DacSample::new(600));
        assert_eq!(tx.phase(), DacPhase::AddressSent);

        // Dropped even while only the start condition is out
        let mut tx = DacTransaction::new(DAC_WRITE_ADDRESS);
        tx.request(DacSample::new(600));
        assert_eq!(tx.request(DacSample::new(100)), None);
        assert_eq!(tx.pending(), DacSample::new(600));
    }

    #[test]
    fn test_spurious_completion_ignored() {
        let mut tx = DacTransaction::new(DAC_WRITE_ADDRESS);
        assert_eq!(tx.on_complete(), None);
        assert!(tx.is_idle());
    }

    #[test]
    fn test_abort_returns_to_idle() {
        let mut tx = DacTransaction::new(DAC_WRITE_ADDRESS);
        tx.request(DacSample::new(600));
        tx.on_complete();
        tx.abort();
        assert!(tx.is_idle());
        assert_eq!(tx.request(DacSample::new(1)), Some(BusOp::Start));
    }
}
