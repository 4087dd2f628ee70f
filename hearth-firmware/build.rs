//! Build script for hearth-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates panel.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sections the firmware parser accepts
const KNOWN_SECTIONS: &[&str] = &[
    "temperature",
    "stage",
    "stall",
    "flame",
    "startup",
    "shutdown",
    "fan",
    "safety",
    "demand",
    "line",
];

const STAGES: &[&str] = &["low", "med", "medium", "high"];
const POLARITIES: &[&str] = &["active_low", "active_high", "low", "high"];
const MAX_LINES: usize = 8;
const MAX_LABEL_LEN: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("cannot create memory.x");
    f.write_all(memory_x).expect("cannot write memory.x");

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate panel.toml at compile time
///
/// The firmware falls back to built-in defaults when the embedded file
/// does not parse, so mistakes are caught here rather than on the boiler.
fn validate_config() {
    println!("cargo:rerun-if-changed=panel.toml");

    let config_path = Path::new("panel.toml");
    if !config_path.exists() {
        fail(
            "panel.toml not found",
            &["The firmware embeds panel.toml from the hearth-firmware directory.".into()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read panel.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in panel.toml",
            &e.to_string().lines().map(String::from).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    let Some(root) = config.as_table() else {
        fail("panel.toml must be a table", &[]);
    };

    for (name, value) in root {
        if !KNOWN_SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
            continue;
        }
        if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }

    validate_temperature(&config, &mut errors);
    validate_stages(&config, &mut errors);
    validate_fan(&config, &mut errors);
    validate_polarities(&config, &mut errors);
    validate_lines(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid panel configuration", &errors);
    }

    println!("cargo:warning=panel.toml validated successfully");
}

fn int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn validate_temperature(config: &toml::Value, errors: &mut Vec<String>) {
    let low = int(config, "temperature", "boiler_low_c").unwrap_or(55);
    let med = int(config, "temperature", "boiler_med_c").unwrap_or(65);
    let high = int(config, "temperature", "boiler_high_c").unwrap_or(75);
    if !(low < med && med < high) {
        errors.push("[temperature] requires boiler_low_c < boiler_med_c < boiler_high_c".into());
    }

    let min = int(config, "temperature", "valid_min_c").unwrap_or(-40);
    let max = int(config, "temperature", "valid_max_c").unwrap_or(150);
    if min >= max {
        errors.push("[temperature] valid_min_c must be below valid_max_c".into());
    }
}

fn validate_stages(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(stages) = config.get("stage").and_then(|s| s.as_table()) else {
        return;
    };

    for (name, stage) in stages {
        if !STAGES.contains(&name.as_str()) {
            errors.push(format!("[stage.{}] must be low, med or high", name));
            continue;
        }
        let on = stage.get("feeder_on_ms").and_then(|v| v.as_integer());
        let off = stage.get("feeder_off_ms").and_then(|v| v.as_integer());
        if on == Some(0) && off == Some(0) {
            errors.push(format!("[stage.{}] duty cycle cannot be zero", name));
        }
        if let Some(power) = stage.get("fan_power").and_then(|v| v.as_integer()) {
            if !(0..=100).contains(&power) {
                errors.push(format!("[stage.{}] fan_power must be 0-100", name));
            }
        }
    }
}

fn validate_fan(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(fan) = config.get("fan").and_then(|f| f.as_table()) else {
        return;
    };

    for (key, value) in fan {
        match value.as_integer() {
            Some(power) if (0..=100).contains(&power) => {}
            _ => errors.push(format!("[fan] {} must be 0-100", key)),
        }
    }
}

fn polarity_ok(value: &toml::Value) -> bool {
    match value {
        toml::Value::String(s) => POLARITIES.contains(&s.as_str()),
        toml::Value::Boolean(_) => true,
        _ => false,
    }
}

fn validate_polarities(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["safety", "demand"] {
        let Some(table) = config.get(section).and_then(|s| s.as_table()) else {
            continue;
        };
        for (key, value) in table {
            if !polarity_ok(value) {
                errors.push(format!(
                    "[{}] {} must be \"active_low\" or \"active_high\"",
                    section, key
                ));
            }
        }
    }
}

fn validate_lines(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(lines) = config.get("line").and_then(|l| l.as_table()) else {
        return;
    };

    if lines.len() > MAX_LINES {
        errors.push(format!("at most {} [line.*] sections are supported", MAX_LINES));
    }

    for (name, line) in lines {
        if name.len() > MAX_LABEL_LEN {
            errors.push(format!(
                "[line.{}] name is longer than {} characters",
                name, MAX_LABEL_LEN
            ));
        }
        if let Some(polarity) = line.get("polarity") {
            if !polarity_ok(polarity) {
                errors.push(format!("[line.{}] polarity is invalid", name));
            }
        }
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, details: &[String]) -> ! {
    let body = details
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
