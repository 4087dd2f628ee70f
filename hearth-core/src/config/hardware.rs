//! Panel wiring configuration
//!
//! Contact polarity and the set of monitored feed lines. Pin numbers are
//! fixed by the board; only the electrical sense of each input varies
//! between installations.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum monitored feed lines
pub const MAX_STALL_LINES: usize = 8;

/// Maximum feed line label length
pub const MAX_LABEL_LEN: usize = 16;

/// Electrical sense of a digital input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// High level means asserted
    #[default]
    ActiveHigh,
    /// Low level means asserted (pulled-up contact to ground)
    ActiveLow,
}

impl Polarity {
    /// Interpret a raw pin level
    #[inline]
    pub const fn is_active(self, raw_high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => raw_high,
            Polarity::ActiveLow => !raw_high,
        }
    }

    /// Raw pin level that reads as `active`
    #[inline]
    pub const fn level_for(self, active: bool) -> bool {
        match self {
            Polarity::ActiveHigh => active,
            Polarity::ActiveLow => !active,
        }
    }

    /// Polarity from an `active_low` flag
    pub const fn from_active_low(active_low: bool) -> Self {
        if active_low {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }
}

/// Polarity of the three safety contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SafetyWiring {
    pub high_limit: Polarity,
    pub backfire: Polarity,
    pub estop: Polarity,
}

impl Default for SafetyWiring {
    /// Safety chains are wired normally-closed to ground
    fn default() -> Self {
        Self {
            high_limit: Polarity::ActiveLow,
            backfire: Polarity::ActiveLow,
            estop: Polarity::ActiveLow,
        }
    }
}

/// A monitored feed line (auger, stoker screw, ash conveyor...)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StallLineConfig {
    /// Line label shown on the panel
    pub name: String<MAX_LABEL_LEN>,
    /// Stall contact polarity
    pub polarity: Polarity,
}

impl StallLineConfig {
    /// Create a line with an active-low stall contact
    pub fn new(name: &str) -> Option<Self> {
        Some(Self {
            name: String::try_from(name).ok()?,
            polarity: Polarity::ActiveLow,
        })
    }
}

/// Complete panel wiring
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    pub safety: SafetyWiring,
    /// Room thermostat / heat demand input
    pub demand: Polarity,
    /// Monitored lines, indexed by stall input number
    pub stall_lines: Vec<StallLineConfig, MAX_STALL_LINES>,
}

impl PanelConfig {
    /// Wiring with no monitored feed lines
    pub fn new() -> Self {
        Self {
            safety: SafetyWiring::default(),
            demand: Polarity::ActiveHigh,
            stall_lines: Vec::new(),
        }
    }

    /// Find a line index by label
    pub fn line_index(&self, name: &str) -> Option<usize> {
        self.stall_lines.iter().position(|l| l.name.as_str() == name)
    }
}

impl Default for PanelConfig {
    /// Single monitored fuel auger
    fn default() -> Self {
        let mut config = Self::new();
        if let Some(line) = StallLineConfig::new("auger") {
            let _ = config.stall_lines.push(line);
        }
        config
    }
}
