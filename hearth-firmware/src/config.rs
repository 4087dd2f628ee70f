//! Embedded panel configuration
//!
//! `panel.toml` is compiled into the image and checked by the build
//! script. Parsing still happens at boot so a firmware built without the
//! build-time check falls back to safe defaults instead of halting.

use defmt::*;
use hearth_core::config::{parse_config, ControllerConfig};

/// Edit panel.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../panel.toml");

/// Parse the embedded configuration
pub fn load() -> ControllerConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Parsed embedded configuration: {} feed line(s)",
                config.panel.stall_lines.len()
            );
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            ControllerConfig::default()
        }
    }
}
