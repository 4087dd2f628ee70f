//! Minimal TOML parser for `panel.toml`
//!
//! Handles only the subset the panel configuration uses. It does NOT
//! support the full TOML grammar and never allocates.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Integers with `_` digit separators (`15_000`)
//! - [section] and [section.name] headers
//! - Comments (# ...), including trailing comments
//!
//! Unknown keys are ignored so older firmware accepts newer files.
//! Unknown sections are rejected.

use heapless::String as HString;

use super::hardware::{PanelConfig, Polarity, StallLineConfig, MAX_LABEL_LEN};
use super::types::{BurnerConfig, ConfigInvalid};
use crate::stage::FiringStage;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Two `[line.*]` sections share a name
    DuplicateLine,
    /// Parsed values are inconsistent
    Invalid(ConfigInvalid),
}

impl From<ConfigInvalid> for ParseError {
    fn from(e: ConfigInvalid) -> Self {
        ParseError::Invalid(e)
    }
}

/// Everything `panel.toml` describes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    pub burner: BurnerConfig,
    pub panel: PanelConfig,
}

/// Current parsing context
#[derive(Debug, Clone)]
enum Section {
    Root,
    Temperature,
    Stage(FiringStage),
    Stall,
    Flame,
    Startup,
    Shutdown,
    Fan,
    Safety,
    Demand,
    Line,
}

/// Parse `panel.toml` into a validated [`ControllerConfig`]
///
/// Sections and keys that are absent keep their defaults. A file that
/// declares any `[line.*]` section replaces the default feed line list.
pub fn parse_config(input: &str) -> Result<ControllerConfig, ParseError> {
    let mut config = ControllerConfig::default();
    let mut section = Section::Root;
    let mut current_line: Option<StallLineConfig> = None;
    let mut lines_declared = false;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            save_line(&mut config.panel, &mut current_line)?;

            section = parse_section_header(&line[1..line.len() - 1])?;
            if let Section::Line = section {
                let name = line[1..line.len() - 1].trim();
                let name = name.split_once('.').map(|(_, n)| n.trim()).unwrap_or("");
                if !lines_declared {
                    config.panel.stall_lines.clear();
                    lines_declared = true;
                }
                current_line =
                    Some(StallLineConfig::new(name).ok_or(ParseError::InvalidSection)?);
            }
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&section, key, value, &mut config, &mut current_line)?;
    }

    save_line(&mut config.panel, &mut current_line)?;
    config.burner.validate()?;

    Ok(config)
}

/// Parse a section header like "flame" or "stage.low"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        let name = name.trim();
        return match kind.trim() {
            "stage" => Ok(Section::Stage(parse_stage(name)?)),
            "line" if !name.is_empty() && name.len() <= MAX_LABEL_LEN => Ok(Section::Line),
            _ => Err(ParseError::InvalidSection),
        };
    }

    match header {
        "temperature" => Ok(Section::Temperature),
        "stall" => Ok(Section::Stall),
        "flame" => Ok(Section::Flame),
        "startup" => Ok(Section::Startup),
        "shutdown" => Ok(Section::Shutdown),
        "fan" => Ok(Section::Fan),
        "safety" => Ok(Section::Safety),
        "demand" => Ok(Section::Demand),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_stage(name: &str) -> Result<FiringStage, ParseError> {
    match name {
        "low" => Ok(FiringStage::Low),
        "med" | "medium" => Ok(FiringStage::Med),
        "high" => Ok(FiringStage::High),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing `# comment` that is not inside a string
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

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse an integer value, allowing `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a polarity: "active_low", "active_high", or a bare `active_low` bool
fn parse_polarity(value: &str) -> Result<Polarity, ParseError> {
    match parse_string(value) {
        "active_low" | "low" => Ok(Polarity::ActiveLow),
        "active_high" | "high" => Ok(Polarity::ActiveHigh),
        other => parse_bool(other).map(Polarity::from_active_low),
    }
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: &Section,
    key: &str,
    value: &str,
    config: &mut ControllerConfig,
    current_line: &mut Option<StallLineConfig>,
) -> Result<(), ParseError> {
    let burner = &mut config.burner;
    match section {
        Section::Root => {}
        Section::Temperature => {
            let t = &mut burner.temperature;
            match key {
                "valid_min_c" => t.valid_min_c = parse_int(value)?,
                "valid_max_c" => t.valid_max_c = parse_int(value)?,
                "boiler_low_c" => t.boiler_low_c = parse_int(value)?,
                "boiler_med_c" => t.boiler_med_c = parse_int(value)?,
                "boiler_high_c" => t.boiler_high_c = parse_int(value)?,
                "stage_deadband_c" => t.stage_deadband_c = parse_int(value)?,
                "chimney_dirty_c" => t.chimney_dirty_c = parse_int(value)?,
                "hot_water_target_c" => t.hot_water_target_c = parse_int(value)?,
                "hot_water_hysteresis_c" => t.hot_water_hysteresis_c = parse_int(value)?,
                _ => {}
            }
        }
        Section::Stage(stage) => {
            let p = burner.stages.profile_mut(*stage);
            match key {
                "feeder_on_ms" => p.feeder_on_ms = parse_int(value)?,
                "feeder_off_ms" => p.feeder_off_ms = parse_int(value)?,
                "fan_power" => p.fan_power = parse_int(value)?,
                _ => {}
            }
        }
        Section::Stall => {
            let s = &mut burner.stall;
            match key {
                "detect_ms" => s.detect_ms = parse_int(value)?,
                "jam_pulse_on_ms" => s.jam_pulse_on_ms = parse_int(value)?,
                "jam_pulse_off_ms" => s.jam_pulse_off_ms = parse_int(value)?,
                "jam_cooldown_ms" => s.jam_cooldown_ms = parse_int(value)?,
                "jam_max_pulses_per_block" => s.jam_max_pulses_per_block = parse_int(value)?,
                "jam_max_blocks" => s.jam_max_blocks = parse_int(value)?,
                _ => {}
            }
        }
        Section::Flame => {
            let f = &mut burner.flame;
            match key {
                "threshold" => f.threshold = parse_int(value)?,
                "interval_ms" => f.interval_ms = parse_int(value)?,
                "samples" => f.samples = parse_int(value)?,
                "startup_stable_ms" => f.startup_stable_ms = parse_int(value)?,
                "startup_prove_timeout_ms" => f.startup_prove_timeout_ms = parse_int(value)?,
                "run_loss_confirm_ms" => f.run_loss_confirm_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Startup => {
            let s = &mut burner.startup;
            match key {
                "purge_ms" => s.purge_ms = parse_int(value)?,
                "feed_ms" => s.feed_ms = parse_int(value)?,
                "retry_delay_ms" => s.retry_delay_ms = parse_int(value)?,
                "max_retries" => s.max_retries = parse_int(value)?,
                "run_max_restarts" => s.run_max_restarts = parse_int(value)?,
                _ => {}
            }
        }
        Section::Shutdown => {
            let s = &mut burner.shutdown;
            match key {
                "pump_overrun_ms" => s.pump_overrun_ms = parse_int(value)?,
                "post_purge_ms" => s.post_purge_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Fan => {
            let f = &mut burner.fan;
            match key {
                "degraded" => f.degraded = parse_int(value)?,
                "startup_purge" => f.startup_purge = parse_int(value)?,
                "startup_feed" => f.startup_feed = parse_int(value)?,
                "startup_prove" => f.startup_prove = parse_int(value)?,
                "restart_delay" => f.restart_delay = parse_int(value)?,
                "shutdown_overrun" => f.shutdown_overrun = parse_int(value)?,
                "shutdown_post_purge" => f.shutdown_post_purge = parse_int(value)?,
                "idle" => f.idle = parse_int(value)?,
                _ => {}
            }
        }
        Section::Safety => {
            let s = &mut config.panel.safety;
            match key {
                "high_limit" => s.high_limit = parse_polarity(value)?,
                "backfire" => s.backfire = parse_polarity(value)?,
                "estop" => s.estop = parse_polarity(value)?,
                _ => {}
            }
        }
        Section::Demand => {
            if key == "polarity" || key == "active_low" {
                config.panel.demand = parse_polarity(value)?;
            }
        }
        Section::Line => {
            let line = current_line.as_mut().ok_or(ParseError::InvalidSection)?;
            if key == "polarity" || key == "active_low" {
                line.polarity = parse_polarity(value)?;
            }
        }
    }

    Ok(())
}

/// Commit the feed line being built
fn save_line(
    panel: &mut PanelConfig,
    current_line: &mut Option<StallLineConfig>,
) -> Result<(), ParseError> {
    if let Some(line) = current_line.take() {
        if panel.line_index(&line.name).is_some() {
            return Err(ParseError::DuplicateLine);
        }
        panel
            .stall_lines
            .push(line)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlameConfig;

    const PANEL: &str = r#"
# Stoker panel, boiler room 2
[temperature]
boiler_low_c = 50
boiler_med_c = 62   # trailing comment
boiler_high_c = 72

[stage.med]
feeder_off_ms = 45_000
fan_power = 65

[flame]
threshold = 420

[safety]
estop = "active_high"

[line.auger]
polarity = "active_low"

[line.ash]
active_low = false
"#;

    #[test]
    fn test_parse_panel() {
        let config = parse_config(PANEL).unwrap();
        let t = &config.burner.temperature;
        assert_eq!((t.boiler_low_c, t.boiler_med_c, t.boiler_high_c), (50, 62, 72));
        assert_eq!(t.chimney_dirty_c, 130);

        let med = config.burner.stages.profile(FiringStage::Med);
        assert_eq!(med.feeder_off_ms, 45_000);
        assert_eq!(med.fan_power, 65);
        assert_eq!(med.feeder_on_ms, 1_500);

        assert_eq!(config.burner.flame.threshold, 420);
        assert_eq!(config.panel.safety.estop, Polarity::ActiveHigh);
        assert_eq!(config.panel.safety.backfire, Polarity::ActiveLow);

        assert_eq!(config.panel.stall_lines.len(), 2);
        assert_eq!(config.panel.stall_lines[0].polarity, Polarity::ActiveLow);
        assert_eq!(config.panel.stall_lines[1].name.as_str(), "ash");
        assert_eq!(config.panel.stall_lines[1].polarity, Polarity::ActiveHigh);
    }

    #[test]
    fn test_empty_input_is_defaults() {
        assert_eq!(parse_config("").unwrap(), ControllerConfig::default());
    }

    #[test]
    fn test_unknown_key_ignored() {
        let config = parse_config("[flame]\nsensitivity = 3\n").unwrap();
        assert_eq!(config.burner.flame, FlameConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert_eq!(
            parse_config("[remote]\nport = 80\n"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(
            parse_config("[stage.turbo]\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_bad_value() {
        assert_eq!(
            parse_config("[fan]\nidle = 300\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[safety]\nestop = sideways\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_garbage_line() {
        assert_eq!(parse_config("[flame]\nthreshold\n"), Err(ParseError::InvalidLine));
    }

    #[test]
    fn test_duplicate_line() {
        let input = "[line.auger]\n[line.auger]\n";
        assert_eq!(parse_config(input), Err(ParseError::DuplicateLine));
    }

    #[test]
    fn test_too_many_lines() {
        let input = "[line.l0]\n[line.l1]\n[line.l2]\n[line.l3]\n\
                     [line.l4]\n[line.l5]\n[line.l6]\n[line.l7]\n[line.l8]\n";
        assert_eq!(parse_config(input), Err(ParseError::TooManyItems));
    }

    #[test]
    fn test_validation_applied() {
        let input = "[temperature]\nboiler_low_c = 80\n";
        assert_eq!(
            parse_config(input),
            Err(ParseError::Invalid(ConfigInvalid::StageThresholds))
        );
    }

    #[test]
    fn test_hash_inside_string() {
        assert_eq!(strip_comment(r#"name = "a#b" # note"#), r#"name = "a#b" "#);
    }

    #[test]
    fn test_shipped_panel_file_matches_defaults() {
        let shipped = include_str!("../../../hearth-firmware/panel.toml");
        let config = parse_config(shipped).unwrap();
        assert_eq!(config, ControllerConfig::default());
    }
}
