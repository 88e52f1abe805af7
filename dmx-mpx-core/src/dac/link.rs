//! DAC transaction bound to a bus

use crate::traits::TwoWireBus;

use super::sample::DacSample;
use super::transaction::{BusOp, DacPhase, DacTransaction};

/// Result of a sample request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestOutcome {
    /// Start condition issued; completions will carry the transaction
    Started,
    /// A transaction was in flight; the sample was discarded
    Dropped,
}

/// Drives a [`DacTransaction`] on a [`TwoWireBus`]
///
/// Never blocks: every call issues at most one bus action and returns.
pub struct DacLink<B> {
    bus: B,
    transaction: DacTransaction,
    dropped: u32,
}

impl<B: TwoWireBus> DacLink<B> {
    /// Create a link to the DAC at `address` (address + W byte)
    pub fn new(bus: B, address: u8) -> Self {
        Self {
            bus,
            transaction: DacTransaction::new(address),
            dropped: 0,
        }
    }

    /// Request transmission of `sample` (dropped if busy)
    pub fn request(&mut self, sample: DacSample) -> Result<RequestOutcome, B::Error> {
        match self.transaction.request(sample) {
            Some(op) => {
                self.issue(op)?;
                Ok(RequestOutcome::Started)
            }
            None => {
                self.dropped = self.dropped.wrapping_add(1);
                Ok(RequestOutcome::Dropped)
            }
        }
    }

    /// Bus completion signal: issue the next action
    ///
    /// Returns the phase reached. On a bus error the transaction is
    /// abandoned and the link is idle again.
    pub fn on_complete(&mut self) -> Result<DacPhase, B::Error> {
        if let Some(op) = self.transaction.on_complete() {
            self.issue(op)?;
        }
        Ok(self.transaction.phase())
    }

    fn issue(&mut self, op: BusOp) -> Result<(), B::Error> {
        let result = match op {
            BusOp::Start => self.bus.start(),
            BusOp::Write(byte) => self.bus.write_byte(byte),
            BusOp::Stop => self.bus.stop(),
        };
        if result.is_err() {
            self.transaction.abort();
        }
        result
    }

    pub fn phase(&self) -> DacPhase {
        self.transaction.phase()
    }

    pub fn is_idle(&self) -> bool {
        self.transaction.is_idle()
    }

    /// Sample of the current (or last) transaction
    pub fn pending(&self) -> DacSample {
        self.transaction.pending()
    }

    /// Requests dropped because the link was busy (wraps)
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
