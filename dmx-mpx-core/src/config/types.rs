//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of analog output channels emitted per MPX scan
///
/// Fixed by the device variant; the scan always covers every channel.
#[cfg(not(feature = "channels-64"))]
pub const MAX_CHANNELS: usize = 16;

/// Number of analog output channels emitted per MPX scan
#[cfg(feature = "channels-64")]
pub const MAX_CHANNELS: usize = 64;

/// Channel slots in a full DMX512 universe (excluding the start code)
pub const DMX_MAX_SLOTS: u16 = 512;

/// DMX512 line rate (8 data bits, no parity, 2 stop bits)
pub const DMX_BAUDRATE: u32 = 250_000;

/// Two-wire DAC address byte with the write bit (7-bit address 0x60)
pub const DAC_WRITE_ADDRESS: u8 = 0b1100_0000;

/// Heartbeat / link supervision period
pub const STATUS_PERIOD_MS: u32 = 500;

/// Longest accepted break threshold (`tick_us * threshold_ticks`)
pub const MAX_BREAK_THRESHOLD_US: u32 = 10_000;

/// Longest accepted MPX pulse width
pub const MAX_PULSE_US: u32 = 1_000_000;

/// How line errors seen during reception are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineErrorPolicy {
    /// Overrun, framing and parity errors all abandon the frame attempt
    #[default]
    ResyncAll,
    /// Only overrun abandons the attempt; framing/parity just clear the
    /// activity lamp and reception continues
    OverrunOnly,
}

/// Break detection sampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BreakTiming {
    /// Sampling tick period in microseconds
    pub tick_us: u32,
    /// Consecutive idle samples that confirm a break
    pub threshold_ticks: u16,
}

impl Default for BreakTiming {
    fn default() -> Self {
        Self {
            tick_us: 4,
            threshold_ticks: 20, // 80us minimum break
        }
    }
}

impl BreakTiming {
    /// Shortest low period accepted as a break, in microseconds
    pub fn min_break_us(&self) -> u32 {
        self.tick_us.saturating_mul(self.threshold_ticks as u32)
    }
}

/// Pulse widths of the analog multiplex scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MpxTiming {
    /// Duration of each channel level pulse (us)
    pub level_pulse_us: u32,
    /// Duration of the short sync pulse between channels (us)
    pub sync_pulse_us: u32,
    /// Duration of the reset pulse closing each scan (us)
    pub long_sync_us: u32,
}

impl Default for MpxTiming {
    fn default() -> Self {
        Self {
            level_pulse_us: 250,
            sync_pulse_us: 250,
            long_sync_us: 5_500,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Start address beyond the universe
    StartAddressOutOfRange,
    /// More channels than the device variant can output
    ChannelCountTooLarge,
    /// `start_address + channel_count` runs past slot 512
    FootprintExceedsUniverse,
    /// Break threshold of zero ticks would confirm on any sample
    ZeroThreshold,
    /// A tick period or pulse width of zero
    ZeroPeriod,
    /// Break threshold above [`MAX_BREAK_THRESHOLD_US`] or a pulse width
    /// above [`MAX_PULSE_US`]
    TimingOutOfRange,
}

/// Complete bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    /// Channel slots skipped after the start code (0-based offset)
    pub start_address: u16,
    /// Channel slots captured per frame
    pub channel_count: u16,
    /// Only accept frames with the null (dimmer data) start code
    pub null_start_only: bool,
    /// Line error handling
    pub error_policy: LineErrorPolicy,
    /// Break detection parameters
    pub break_timing: BreakTiming,
    /// Analog scan pulse widths
    pub mpx_timing: MpxTiming,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            start_address: 0,
            channel_count: MAX_CHANNELS as u16,
            null_start_only: true,
            error_policy: LineErrorPolicy::ResyncAll,
            break_timing: BreakTiming::default(),
            mpx_timing: MpxTiming::default(),
        }
    }
}

impl BridgeConfig {
    /// Create a configuration for a channel window with default timing
    pub fn with_window(start_address: u16, channel_count: u16) -> Result<Self, ConfigError> {
        let config = Self {
            start_address,
            channel_count,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field against the device limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_address > DMX_MAX_SLOTS {
            return Err(ConfigError::StartAddressOutOfRange);
        }
        if self.channel_count as usize > MAX_CHANNELS {
            return Err(ConfigError::ChannelCountTooLarge);
        }
        if self.start_address + self.channel_count > DMX_MAX_SLOTS {
            return Err(ConfigError::FootprintExceedsUniverse);
        }
        if self.break_timing.threshold_ticks == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        let t = &self.mpx_timing;
        if self.break_timing.tick_us == 0
            || t.level_pulse_us == 0
            || t.sync_pulse_us == 0
            || t.long_sync_us == 0
        {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.break_timing.min_break_us() > MAX_BREAK_THRESHOLD_US
            || t.level_pulse_us > MAX_PULSE_US
            || t.sync_pulse_us > MAX_PULSE_US
            || t.long_sync_us > MAX_PULSE_US
        {
            return Err(ConfigError::TimingOutOfRange);
        }
        Ok(())
    }

    /// Total bytes after the break (start code included) consumed by one frame
    pub fn frame_footprint(&self) -> u16 {
        1 + self.start_address + self.channel_count
    }
}
