//! Build script for dmx-mpx-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bridge.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Channel slots in a DMX512 universe
const DMX_MAX_SLOTS: i64 = 512;

/// Longest break threshold the firmware accepts (us)
const MAX_BREAK_THRESHOLD_US: i64 = 10_000;

/// Longest MPX pulse width the firmware accepts (us)
const MAX_PULSE_US: i64 = 1_000_000;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Output channels of the variant being built
fn max_channels() -> i64 {
    if env::var_os("CARGO_FEATURE_CHANNELS_64").is_some() {
        64
    } else {
        16
    }
}

/// Validate bridge.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bridge.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds bridge.toml as its power-up configuration.  ║\n\
            ║  Please create one in the dmx-mpx-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bridge.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_dmx(&config, &mut errors);
    validate_break(&config, &mut errors);
    validate_mpx(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid bridge configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=bridge.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only `[dmx]`, `[break]` and `[mpx]` tables are understood by the firmware
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !["dmx", "break", "mpx"].contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Look up an optional integer, recording a type error
fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match config.get(section).and_then(|s| s.get(key)) {
        None => None,
        Some(toml::Value::Integer(v)) => Some(*v),
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn validate_dmx(config: &toml::Value, errors: &mut Vec<String>) {
    let start = integer(config, "dmx", "start_address", errors).unwrap_or(0);
    let count = integer(config, "dmx", "channel_count", errors).unwrap_or(max_channels());

    if !(0..=DMX_MAX_SLOTS).contains(&start) {
        errors.push(format!("[dmx] start_address must be 0-{}", DMX_MAX_SLOTS));
    }
    if !(0..=max_channels()).contains(&count) {
        errors.push(format!("[dmx] channel_count must be 0-{}", max_channels()));
    }
    if start + count > DMX_MAX_SLOTS {
        errors.push(format!(
            "[dmx] start_address + channel_count exceeds {} slots",
            DMX_MAX_SLOTS
        ));
    }

    if let Some(value) = config.get("dmx").and_then(|s| s.get("null_start_only")) {
        if !value.is_bool() {
            errors.push("[dmx] null_start_only must be true or false".to_string());
        }
    }

    if let Some(value) = config.get("dmx").and_then(|s| s.get("error_policy")) {
        match value.as_str() {
            Some("resync_all") | Some("overrun_only") => {}
            _ => errors.push(
                "[dmx] error_policy must be 'resync_all' or 'overrun_only'".to_string(),
            ),
        }
    }
}

fn validate_break(config: &toml::Value, errors: &mut Vec<String>) {
    let tick = integer(config, "break", "tick_us", errors).unwrap_or(4);
    let threshold = integer(config, "break", "threshold_ticks", errors).unwrap_or(20);

    if tick <= 0 {
        errors.push("[break] tick_us must be positive".to_string());
    }
    if !(1..=u16::MAX as i64).contains(&threshold) {
        errors.push("[break] threshold_ticks must be 1-65535".to_string());
    }
    if tick > 0 && tick.saturating_mul(threshold) > MAX_BREAK_THRESHOLD_US {
        errors.push(format!(
            "[break] tick_us * threshold_ticks must be at most {}us",
            MAX_BREAK_THRESHOLD_US
        ));
        return;
    }
    // DMX512 breaks are at least 88us; anything above that misses valid frames
    if tick > 0 && tick.saturating_mul(threshold) > 88 {
        println!(
            "cargo:warning=bridge.toml: break threshold of {}us is longer than the 88us DMX512 minimum",
            tick * threshold
        );
    }
}

fn validate_mpx(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["level_pulse_us", "sync_pulse_us", "long_sync_us"] {
        if let Some(v) = integer(config, "mpx", key, errors) {
            if !(1..=MAX_PULSE_US).contains(&v) {
                errors.push(format!("[mpx] {} must be 1-{}", key, MAX_PULSE_US));
            }
        }
    }
}
