//! DAC sample encoding

/// A 10-bit DAC code
///
/// The analog stage maps code 0 to -10 V, 511 to 0 V and 1023 to +10 V.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DacSample(u16);

impl DacSample {
    /// Largest 10-bit code
    pub const MAX: u16 = 0x3FF;

    /// Negative reference pulse (-10 V)
    pub const SYNC: Self = Self(0);

    /// 0 V output
    pub const ZERO_VOLTS: Self = Self(0b01_1111_1111);

    /// +10 V output
    pub const FULL_SCALE: Self = Self(Self::MAX);

    /// Create a sample, clamping to 10 bits
    pub const fn new(value: u16) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// First data byte of a fast write: `D9..D6` in the low nibble
    pub const fn high_byte(self) -> u8 {
        ((self.0 >> 6) & 0x0F) as u8
    }

    /// Second data byte of a fast write: `D5..D0` left-aligned
    pub const fn low_byte(self) -> u8 {
        (self.0 << 2) as u8
    }
}

/// Map an 8-bit DMX level onto the upper half of the DAC range
///
/// `0..=255` becomes `512..=1022`, so a level never collides with the
/// sync code.
pub const fn encode_level(level: u8) -> DacSample {
    DacSample(level as u16 * 2 + 512)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bounds() {
        assert_eq!(encode_level(0).value(), 512);
        assert_eq!(encode_level(255).value(), 1022);
        assert_eq!(encode_level(128).value(), 768);
        assert!(encode_level(0) > DacSample::ZERO_VOLTS);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(DacSample::new(5000), DacSample::FULL_SCALE);
        assert_eq!(DacSample::new(7).value(), 7);
    }

    #[test]
    fn test_fast_write_bytes() {
        let s = DacSample::new(0b11_0101_1001);
        assert_eq!(s.high_byte(), 0b1101);
        assert_eq!(s.low_byte(), 0b0110_0100);

        assert_eq!(DacSample::SYNC.high_byte(), 0);
        assert_eq!(DacSample::SYNC.low_byte(), 0);
        assert_eq!(DacSample::FULL_SCALE.high_byte(), 0x0F);
        assert_eq!(DacSample::FULL_SCALE.low_byte(), 0xFC);
    }
}
