//! Combustion configuration
//!
//! Every threshold and timing constant the burner logic consumes. The
//! defaults match the commissioning values of the reference stoker panel;
//! `panel.toml` overrides individual keys.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::stage::FiringStage;

/// Fan power in percent (0-100)
pub type FanPower = u8;

/// Upper bound for fan power values
pub const FAN_POWER_MAX: FanPower = 100;

/// Capacity of the flame sample window
pub const MAX_FLAME_SAMPLES: usize = 32;

/// Temperature thresholds (whole °C)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemperatureConfig {
    /// Lowest plausible probe reading
    pub valid_min_c: i16,
    /// Highest plausible probe reading
    pub valid_max_c: i16,
    /// Below this the burner falls back to the Low stage
    pub boiler_low_c: i16,
    /// At/above this the burner escalates to Med
    pub boiler_med_c: i16,
    /// At/above this the burner escalates to High
    pub boiler_high_c: i16,
    /// Deadband applied to downward stage changes
    pub stage_deadband_c: i16,
    /// Flue gas temperature that flags a dirty chimney
    pub chimney_dirty_c: i16,
    /// Domestic hot water set point
    pub hot_water_target_c: i16,
    /// Hot water re-call hysteresis
    pub hot_water_hysteresis_c: i16,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            valid_min_c: -40,
            valid_max_c: 150,
            boiler_low_c: 55,
            boiler_med_c: 65,
            boiler_high_c: 75,
            stage_deadband_c: 2,
            chimney_dirty_c: 130,
            hot_water_target_c: 60,
            hot_water_hysteresis_c: 2,
        }
    }
}

/// Actuator profile of a single firing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StageProfile {
    /// Feeder run time per duty cycle
    pub feeder_on_ms: u32,
    /// Feeder rest time per duty cycle
    pub feeder_off_ms: u32,
    /// Combustion fan power
    pub fan_power: FanPower,
}

impl StageProfile {
    /// Length of one full feeder duty cycle
    pub const fn cycle_ms(&self) -> u32 {
        self.feeder_on_ms.saturating_add(self.feeder_off_ms)
    }
}

/// Stage profiles keyed by [`FiringStage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StageTable {
    pub low: StageProfile,
    pub med: StageProfile,
    pub high: StageProfile,
}

impl StageTable {
    /// Look up the profile for a stage
    pub const fn profile(&self, stage: FiringStage) -> StageProfile {
        match stage {
            FiringStage::Low => self.low,
            FiringStage::Med => self.med,
            FiringStage::High => self.high,
        }
    }

    /// Mutable access for the config parser
    pub fn profile_mut(&mut self, stage: FiringStage) -> &mut StageProfile {
        match stage {
            FiringStage::Low => &mut self.low,
            FiringStage::Med => &mut self.med,
            FiringStage::High => &mut self.high,
        }
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            low: StageProfile {
                feeder_on_ms: 2_000,
                feeder_off_ms: 30_000,
                fan_power: 80,
            },
            med: StageProfile {
                feeder_on_ms: 1_500,
                feeder_off_ms: 60_000,
                fan_power: 60,
            },
            high: StageProfile {
                feeder_on_ms: 1_000,
                feeder_off_ms: 90_000,
                fan_power: 40,
            },
        }
    }
}

/// Stall detection and jam clearing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StallConfig {
    /// Contact must hold this long to count as stalled (and as cleared)
    pub detect_ms: u32,
    /// Feeder on-time of a clearing pulse
    pub jam_pulse_on_ms: u32,
    /// Feeder off-time between clearing pulses
    pub jam_pulse_off_ms: u32,
    /// Rest after an exhausted pulse block
    pub jam_cooldown_ms: u32,
    /// Pulses per block
    pub jam_max_pulses_per_block: u8,
    /// Pulse blocks per jam episode before the burner faults
    pub jam_max_blocks: u8,
}

impl Default for StallConfig {
    fn default() -> Self {
        Self {
            detect_ms: 300,
            jam_pulse_on_ms: 500,
            jam_pulse_off_ms: 700,
            jam_cooldown_ms: 10_000,
            jam_max_pulses_per_block: 6,
            jam_max_blocks: 3,
        }
    }
}

/// Flame sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlameConfig {
    /// Averaged raw value at/above which flame is present
    pub threshold: u16,
    /// Evaluation cadence of the averaged value
    pub interval_ms: u32,
    /// Samples in the rolling window (capped at [`MAX_FLAME_SAMPLES`])
    pub samples: u8,
    /// Continuous presence required to prove ignition
    pub startup_stable_ms: u32,
    /// Proving gives up after this long
    pub startup_prove_timeout_ms: u32,
    /// Continuous absence that confirms flame loss while running
    pub run_loss_confirm_ms: u32,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            threshold: 500,
            interval_ms: 1_000,
            samples: 10,
            startup_stable_ms: 4_000,
            startup_prove_timeout_ms: 120_000,
            run_loss_confirm_ms: 8_000,
        }
    }
}

/// Ignition sequence and retry budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartupConfig {
    pub purge_ms: u32,
    pub feed_ms: u32,
    pub retry_delay_ms: u32,
    /// Failed ignitions tolerated before faulting
    pub max_retries: u8,
    /// Flame losses tolerated per heat cycle before faulting
    pub run_max_restarts: u8,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            purge_ms: 15_000,
            feed_ms: 3_000,
            retry_delay_ms: 10_000,
            max_retries: 2,
            run_max_restarts: 2,
        }
    }
}

/// Shutdown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShutdownConfig {
    pub pump_overrun_ms: u32,
    pub post_purge_ms: u32,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            pump_overrun_ms: 90_000,
            post_purge_ms: 20_000,
        }
    }
}

/// Fan power per non-running phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FanConfig {
    /// Running with a failed boiler probe
    pub degraded: FanPower,
    pub startup_purge: FanPower,
    pub startup_feed: FanPower,
    pub startup_prove: FanPower,
    pub restart_delay: FanPower,
    pub shutdown_overrun: FanPower,
    pub shutdown_post_purge: FanPower,
    /// Idle and fault
    pub idle: FanPower,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            degraded: 20,
            startup_purge: 100,
            startup_feed: 85,
            startup_prove: 70,
            restart_delay: 0,
            shutdown_overrun: 30,
            shutdown_post_purge: 80,
            idle: 0,
        }
    }
}

/// Complete burner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BurnerConfig {
    pub temperature: TemperatureConfig,
    pub stages: StageTable,
    pub stall: StallConfig,
    pub flame: FlameConfig,
    pub startup: StartupConfig,
    pub shutdown: ShutdownConfig,
    pub fan: FanConfig,
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigInvalid {
    /// Probe range is empty
    TemperatureRange,
    /// Stage thresholds are not strictly ascending
    StageThresholds,
    /// A fan power exceeds 100%
    FanPower,
    /// Flame window is empty or larger than the buffer
    FlameSamples,
    /// Flame evaluation interval is zero
    FlameInterval,
    /// Jam budget allows no pulses or no blocks
    JamBudget,
    /// A stage has no feeder time at all
    StageCycle,
}

impl BurnerConfig {
    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigInvalid> {
        let t = &self.temperature;
        if t.valid_min_c >= t.valid_max_c {
            return Err(ConfigInvalid::TemperatureRange);
        }
        if !(t.boiler_low_c < t.boiler_med_c && t.boiler_med_c < t.boiler_high_c) {
            return Err(ConfigInvalid::StageThresholds);
        }
        if t.stage_deadband_c < 0 {
            return Err(ConfigInvalid::StageThresholds);
        }

        let f = &self.fan;
        let stage_fans = [
            self.stages.low.fan_power,
            self.stages.med.fan_power,
            self.stages.high.fan_power,
        ];
        let phase_fans = [
            f.degraded,
            f.startup_purge,
            f.startup_feed,
            f.startup_prove,
            f.restart_delay,
            f.shutdown_overrun,
            f.shutdown_post_purge,
            f.idle,
        ];
        if stage_fans
            .iter()
            .chain(phase_fans.iter())
            .any(|&p| p > FAN_POWER_MAX)
        {
            return Err(ConfigInvalid::FanPower);
        }

        for stage in FiringStage::ALL {
            if self.stages.profile(stage).cycle_ms() == 0 {
                return Err(ConfigInvalid::StageCycle);
            }
        }

        if self.flame.samples == 0 || self.flame.samples as usize > MAX_FLAME_SAMPLES {
            return Err(ConfigInvalid::FlameSamples);
        }
        if self.flame.interval_ms == 0 {
            return Err(ConfigInvalid::FlameInterval);
        }

        if self.stall.jam_max_pulses_per_block == 0 || self.stall.jam_max_blocks == 0 {
            return Err(ConfigInvalid::JamBudget);
        }

        Ok(())
    }
}
