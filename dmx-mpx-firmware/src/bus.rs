//! Staged two-wire bus for the DAC
//!
//! The core drives the DAC transaction one bus condition at a time. The RP2040
//! I2C block instead takes a whole write (address, then data) in one go, so
//! this bus collects the conditions and hands a complete write to the DAC
//! task when the stop condition is issued.

use heapless::Vec;

use dmx_mpx_core::traits::TwoWireBus;

/// Data bytes per DAC write (high byte, low byte)
pub const MAX_PAYLOAD: usize = 4;

/// Staging errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageError {
    /// Start issued while a previous write is still waiting to be flushed
    Busy,
    /// Byte or stop issued without a start
    NotStarted,
    /// More data bytes than one DAC write carries
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Open,
    Flush,
}

/// One complete bus write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedWrite {
    /// 7-bit device address
    pub address: u8,
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

/// Two-wire bus that buffers a transaction until its stop condition
pub struct StagedBus {
    stage: Stage,
    address: Option<u8>,
    payload: Vec<u8, MAX_PAYLOAD>,
}

impl StagedBus {
    pub const fn new() -> Self {
        Self {
            stage: Stage::Idle,
            address: None,
            payload: Vec::new(),
        }
    }

    /// Take the write completed by the last stop condition, if any
    pub fn take_write(&mut self) -> Option<StagedWrite> {
        if self.stage != Stage::Flush {
            return None;
        }
        self.stage = Stage::Idle;
        let address = self.address.take()?;
        Some(StagedWrite {
            address,
            payload: core::mem::take(&mut self.payload),
        })
    }
}

impl TwoWireBus for StagedBus {
    type Error = StageError;

    fn start(&mut self) -> Result<(), StageError> {
        if self.stage == Stage::Flush {
            return Err(StageError::Busy);
        }
        self.stage = Stage::Open;
        self.address = None;
        self.payload.clear();
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), StageError> {
        if self.stage != Stage::Open {
            return Err(StageError::NotStarted);
        }
        match self.address {
            // Address byte carries the R/W bit in bit 0
            None => self.address = Some(byte >> 1),
            Some(_) => self
                .payload
                .push(byte)
                .map_err(|_| StageError::Overflow)?,
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StageError> {
        if self.stage != Stage::Open {
            return Err(StageError::NotStarted);
        }
        self.stage = Stage::Flush;
        Ok(())
    }
}
