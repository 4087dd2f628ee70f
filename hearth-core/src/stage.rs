//! Firing stage selection
//!
//! Maps the boiler temperature to a firing intensity. Escalation is
//! immediate at the thresholds; de-escalation waits for the temperature
//! to fall a deadband below them so the stage does not chatter.

use crate::config::TemperatureConfig;
use crate::sensor::TemperatureReading;

/// Firing intensity while running
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FiringStage {
    #[default]
    Low,
    Med,
    High,
}

impl FiringStage {
    pub const ALL: [FiringStage; 3] = [FiringStage::Low, FiringStage::Med, FiringStage::High];
}

/// Selector output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageTarget {
    /// Keep the current stage
    Hold,
    Stage(FiringStage),
}

/// Compute the target stage
///
/// `boiler` is `None` while the boiler probe is faulted; the stage is then
/// held so a bad probe can never escalate firing.
pub fn select(
    current: FiringStage,
    boiler: Option<TemperatureReading>,
    demand: bool,
    config: &TemperatureConfig,
) -> StageTarget {
    let Some(boiler) = boiler else {
        return StageTarget::Hold;
    };
    if !demand {
        return StageTarget::Hold;
    }

    let mut stage = current;
    if boiler.at_least_c(config.boiler_high_c) {
        stage = FiringStage::High;
    } else if boiler.at_least_c(config.boiler_med_c) {
        stage = stage.max(FiringStage::Med);
    }

    let deadband = config.stage_deadband_c;
    if stage == FiringStage::High && boiler.below_c(config.boiler_high_c - deadband) {
        stage = FiringStage::Med;
    }
    if stage != FiringStage::Low && boiler.below_c(config.boiler_low_c - deadband) {
        stage = FiringStage::Low;
    }

    StageTarget::Stage(stage)
}

/// Flue gas hot enough to indicate a dirty chimney
pub fn chimney_dirty(chimney: TemperatureReading, config: &TemperatureConfig) -> bool {
    chimney.above_c(config.chimney_dirty_c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{normalize, ProbeSample};

    fn reading(celsius_x10: i16) -> Option<TemperatureReading> {
        normalize(ProbeSample::ok(celsius_x10), &TemperatureConfig::default()).ok()
    }

    fn sel(current: FiringStage, x10: i16) -> StageTarget {
        select(current, reading(x10), true, &TemperatureConfig::default())
    }

    use FiringStage::*;

    #[test]
    fn test_escalation() {
        assert_eq!(sel(Low, 200), StageTarget::Stage(Low));
        assert_eq!(sel(Low, 649), StageTarget::Stage(Low));
        assert_eq!(sel(Low, 650), StageTarget::Stage(Med));
        assert_eq!(sel(Low, 660), StageTarget::Stage(Med));
        assert_eq!(sel(Low, 750), StageTarget::Stage(High));
        assert_eq!(sel(Med, 760), StageTarget::Stage(High));
    }

    #[test]
    fn test_high_deadband() {
        assert_eq!(sel(High, 740), StageTarget::Stage(High));
        assert_eq!(sel(High, 730), StageTarget::Stage(High));
        assert_eq!(sel(High, 729), StageTarget::Stage(Med));
    }

    #[test]
    fn test_band_holds_current() {
        assert_eq!(sel(Med, 600), StageTarget::Stage(Med));
        assert_eq!(sel(Low, 600), StageTarget::Stage(Low));
        // Below LOW but inside the deadband
        assert_eq!(sel(Med, 540), StageTarget::Stage(Med));
        assert_eq!(sel(Med, 529), StageTarget::Stage(Low));
        assert_eq!(sel(High, 400), StageTarget::Stage(Low));
    }

    #[test]
    fn test_hold_without_demand_or_probe() {
        let cfg = TemperatureConfig::default();
        assert_eq!(select(Med, reading(800), false, &cfg), StageTarget::Hold);
        assert_eq!(select(Low, None, true, &cfg), StageTarget::Hold);
    }

    #[test]
    fn test_chimney() {
        let cfg = TemperatureConfig::default();
        assert!(!chimney_dirty(reading(1300).unwrap(), &cfg));
        assert!(chimney_dirty(reading(1301).unwrap(), &cfg));
    }
}
