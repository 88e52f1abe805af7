//! Minimal parser for `bridge.toml`
//!
//! Handles only the subset needed for the bridge configuration. It does NOT
//! support full TOML and never allocates.
//!
//! Supported features:
//! - `[dmx]`, `[break]` and `[mpx]` section headers
//! - `key = value` pairs with integer, boolean and basic string values
//! - Comments (`# ...`), also trailing a value
//!
//! Keys that are absent keep their [`BridgeConfig::default`] value.

use heapless::String;

use super::types::{BridgeConfig, ConfigError, LineErrorPolicy};

/// Longest key name reported back in [`ParseError::UnknownKey`]
pub const MAX_KEY_LEN: usize = 24;

/// Parse error
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section header that is not `[dmx]`, `[break]` or `[mpx]`
    InvalidSection { line: u16 },
    /// Line is neither a header nor `key = value`
    Syntax { line: u16 },
    /// Key not known in its section (truncated to [`MAX_KEY_LEN`])
    UnknownKey {
        line: u16,
        key: String<MAX_KEY_LEN>,
    },
    /// Value has the wrong type or does not fit the field
    InvalidValue { line: u16 },
    /// File parsed but the result is not a usable configuration
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Dmx,
    Break,
    Mpx,
}

/// Parse configuration text into a validated [`BridgeConfig`]
pub fn parse_config(input: &str) -> Result<BridgeConfig, ParseError> {
    let mut config = BridgeConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = (index + 1).min(u16::MAX as usize) as u16;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = match line[1..line.len() - 1].trim() {
                "dmx" => Section::Dmx,
                "break" => Section::Break,
                "mpx" => Section::Mpx,
                _ => return Err(ParseError::InvalidSection { line: line_no }),
            };
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or(ParseError::Syntax { line: line_no })?;
        if key.is_empty() || value.is_empty() {
            return Err(ParseError::Syntax { line: line_no });
        }

        apply(&mut config, section, key, value, line_no)?;
    }

    config.validate()?;
    Ok(config)
}

/// Assign one `key = value` pair within its section
fn apply(
    config: &mut BridgeConfig,
    section: Section,
    key: &str,
    value: &str,
    line: u16,
) -> Result<(), ParseError> {
    let invalid = ParseError::InvalidValue { line };

    match (section, key) {
        (Section::Dmx, "start_address") => {
            config.start_address = parse_int(value).ok_or(invalid)?;
        }
        (Section::Dmx, "channel_count") => {
            config.channel_count = parse_int(value).ok_or(invalid)?;
        }
        (Section::Dmx, "null_start_only") => {
            config.null_start_only = parse_bool(value).ok_or(invalid)?;
        }
        (Section::Dmx, "error_policy") => {
            config.error_policy = match parse_str(value).ok_or(invalid.clone())? {
                "resync_all" => LineErrorPolicy::ResyncAll,
                "overrun_only" => LineErrorPolicy::OverrunOnly,
                _ => return Err(invalid),
            };
        }
        (Section::Break, "tick_us") => {
            config.break_timing.tick_us = parse_int(value).ok_or(invalid)?;
        }
        (Section::Break, "threshold_ticks") => {
            config.break_timing.threshold_ticks = parse_int(value).ok_or(invalid)?;
        }
        (Section::Mpx, "level_pulse_us") => {
            config.mpx_timing.level_pulse_us = parse_int(value).ok_or(invalid)?;
        }
        (Section::Mpx, "sync_pulse_us") => {
            config.mpx_timing.sync_pulse_us = parse_int(value).ok_or(invalid)?;
        }
        (Section::Mpx, "long_sync_us") => {
            config.mpx_timing.long_sync_us = parse_int(value).ok_or(invalid)?;
        }
        _ => {
            let mut name = String::new();
            for c in key.chars() {
                if name.push(c).is_err() {
                    break;
                }
            }
            return Err(ParseError::UnknownKey { line, key: name });
        }
    }

    Ok(())
}

/// Drop a `#` comment unless it sits inside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse an integer, accepting `_` digit separators
fn parse_int<T: TryFrom<u32>>(value: &str) -> Option<T> {
    let mut acc: u32 = 0;
    let mut digits = 0;
    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(10)?;
        acc = acc.checked_mul(10)?.checked_add(d)?;
        digits += 1;
    }
    if digits == 0 {
        return None;
    }
    T::try_from(acc).ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_str(value: &str) -> Option<&str> {
    value.strip_prefix('"')?.strip_suffix('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BreakTiming, MpxTiming};

    const SAMPLE: &str = r#"
# Front rack, second universe patch
[dmx]
start_address = 10   # skip the first ten slots
channel_count = 12
null_start_only = false
error_policy = "overrun_only"

[break]
tick_us = 4
threshold_ticks = 22

[mpx]
level_pulse_us = 250
sync_pulse_us = 250
long_sync_us = 5_500
"#;

    #[test]
    fn test_parse_full_file() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.start_address, 10);
        assert_eq!(config.channel_count, 12);
        assert!(!config.null_start_only);
        assert_eq!(config.error_policy, LineErrorPolicy::OverrunOnly);
        assert_eq!(config.break_timing.threshold_ticks, 22);
        assert_eq!(config.mpx_timing, MpxTiming::default());
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), BridgeConfig::default());
        assert_eq!(parse_config("# only a comment\n").unwrap().break_timing, BreakTiming::default());
    }

    #[test]
    fn test_unknown_key_reported_with_line() {
        let err = parse_config("[dmx]\nstart_adress = 3\n").unwrap_err();
        match err {
            ParseError::UnknownKey { line, key } => {
                assert_eq!(line, 2);
                assert_eq!(key.as_str(), "start_adress");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_key_outside_its_section() {
        let err = parse_config("tick_us = 4\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownKey { line: 1, .. }));
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            parse_config("[dmx]\nchannel_count = -1\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[dmx]\nstart_address = 70000\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[dmx]\nnull_start_only = yes\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[dmx]\nerror_policy = \"retry\"\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse_config("[ui]\n"), Err(ParseError::InvalidSection { line: 1 }));
        assert_eq!(parse_config("[dmx]\nchannel_count\n"), Err(ParseError::Syntax { line: 2 }));
        assert_eq!(parse_config("[dmx]\nchannel_count =\n"), Err(ParseError::Syntax { line: 2 }));
    }

    #[test]
    fn test_result_is_validated() {
        assert_eq!(
            parse_config("[dmx]\nstart_address = 510\nchannel_count = 8\n"),
            Err(ParseError::Invalid(ConfigError::FootprintExceedsUniverse))
        );
    }
}
