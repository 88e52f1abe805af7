//! Byte-level two-wire (I2C) master

/// Non-blocking, byte-sequenced two-wire bus master
///
/// Each call only *issues* a bus action and returns immediately. The
/// peripheral later reports completion (the "byte transmitted" / "stop
/// done" interrupt), which the owner forwards to
/// [`DacLink::on_complete`](crate::dac::DacLink::on_complete).
pub trait TwoWireBus {
    /// Error type for bus operations
    type Error;

    /// Issue a start condition
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Shift out one byte (address byte or data byte)
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Issue a stop condition
    fn stop(&mut self) -> Result<(), Self::Error>;
}
