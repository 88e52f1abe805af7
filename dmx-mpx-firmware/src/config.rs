//! Power-up configuration
//!
//! The bridge configuration is compiled in from `bridge.toml`, which the
//! build script has already validated. Parsing happens again at boot with
//! the core's no_std parser.

use defmt::*;

use dmx_mpx_core::config::parse_config;
use dmx_mpx_core::BridgeConfig;

/// Embedded configuration (edit bridge.toml and rebuild to customize)
const EMBEDDED_CONFIG: &str = include_str!("../bridge.toml");

/// Load the embedded configuration, falling back to defaults
pub fn load() -> BridgeConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // Only reachable if bridge.toml and the build check disagree
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            BridgeConfig::default()
        }
    }
}
