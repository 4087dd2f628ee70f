//! Temperature probe normalization
//!
//! Raw probe values arrive already calibrated (tenths of °C) together with
//! a fault flag from the bus. Anything flagged or outside the plausible
//! range becomes a [`SensorFault`] and is never used for control.

use crate::config::TemperatureConfig;

/// Temperature probes on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeId {
    /// Boiler water jacket
    Boiler,
    /// Domestic hot water cylinder
    HotWater,
    /// Flue gas
    Chimney,
}

impl ProbeId {
    pub const ALL: [ProbeId; 3] = [ProbeId::Boiler, ProbeId::HotWater, ProbeId::Chimney];

    /// Dense index for per-probe tables
    pub const fn index(self) -> usize {
        match self {
            ProbeId::Boiler => 0,
            ProbeId::HotWater => 1,
            ProbeId::Chimney => 2,
        }
    }
}

/// Raw sample as delivered by the probe bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeSample {
    /// Temperature in 0.1°C units
    pub celsius_x10: i16,
    /// Bus or converter reported a fault
    pub fault: bool,
}

impl ProbeSample {
    /// A healthy sample
    pub const fn ok(celsius_x10: i16) -> Self {
        Self {
            celsius_x10,
            fault: false,
        }
    }

    /// A faulted sample
    pub const fn faulted() -> Self {
        Self {
            celsius_x10: 0,
            fault: true,
        }
    }
}

/// Why a reading was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorFault {
    /// The source flagged the sample (open/shorted probe, bus error)
    Flagged,
    /// Value outside the plausible range
    OutOfRange,
}

/// A temperature that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureReading(i16);

impl TemperatureReading {
    /// Temperature in 0.1°C units
    pub const fn celsius_x10(self) -> i16 {
        self.0
    }

    /// Check the reading against a whole-degree threshold
    pub const fn at_least_c(self, celsius: i16) -> bool {
        self.0 as i32 >= celsius as i32 * 10
    }

    /// Strictly below a whole-degree threshold
    pub const fn below_c(self, celsius: i16) -> bool {
        (self.0 as i32) < celsius as i32 * 10
    }

    /// Strictly above a whole-degree threshold
    pub const fn above_c(self, celsius: i16) -> bool {
        self.0 as i32 > celsius as i32 * 10
    }
}

/// Result of normalizing one probe
pub type ProbeResult = Result<TemperatureReading, SensorFault>;

/// Validate a raw sample (range bounds inclusive)
pub fn normalize(sample: ProbeSample, config: &TemperatureConfig) -> ProbeResult {
    if sample.fault {
        return Err(SensorFault::Flagged);
    }
    let value = sample.celsius_x10 as i32;
    let min = config.valid_min_c as i32 * 10;
    let max = config.valid_max_c as i32 * 10;
    if value < min || value > max {
        return Err(SensorFault::OutOfRange);
    }
    Ok(TemperatureReading(sample.celsius_x10))
}

/// Change in a probe's fault state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultEdge {
    Raised(SensorFault),
    Cleared,
}

/// Latest normalized value of every probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorNormalizer {
    latest: [Option<ProbeResult>; 3],
}

impl SensorNormalizer {
    pub const fn new() -> Self {
        Self { latest: [None; 3] }
    }

    /// Normalize a fresh sample and report a fault edge, if any
    pub fn update(
        &mut self,
        probe: ProbeId,
        sample: ProbeSample,
        config: &TemperatureConfig,
    ) -> Option<FaultEdge> {
        let result = normalize(sample, config);
        let previous = self.latest[probe.index()].replace(result);

        let was_faulted = matches!(previous, Some(Err(_)));
        match result {
            Err(fault) if previous != Some(Err(fault)) => Some(FaultEdge::Raised(fault)),
            Ok(_) if was_faulted => Some(FaultEdge::Cleared),
            _ => None,
        }
    }

    /// Latest result for a probe, `None` before its first sample
    pub fn latest(&self, probe: ProbeId) -> Option<ProbeResult> {
        self.latest[probe.index()]
    }

    /// Latest valid reading, `None` if faulted or never sampled
    pub fn reading(&self, probe: ProbeId) -> Option<TemperatureReading> {
        self.latest(probe).and_then(Result::ok)
    }

    /// Latest fault, `None` if healthy or never sampled
    pub fn fault(&self, probe: ProbeId) -> Option<SensorFault> {
        self.latest(probe).and_then(Result::err)
    }
}

impl Default for SensorNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> TemperatureConfig {
        TemperatureConfig::default()
    }

    #[test]
    fn test_bounds_inclusive() {
        assert!(normalize(ProbeSample::ok(-400), &cfg()).is_ok());
        assert!(normalize(ProbeSample::ok(1500), &cfg()).is_ok());
        assert_eq!(
            normalize(ProbeSample::ok(-401), &cfg()),
            Err(SensorFault::OutOfRange)
        );
        assert_eq!(
            normalize(ProbeSample::ok(1501), &cfg()),
            Err(SensorFault::OutOfRange)
        );
    }

    #[test]
    fn test_flag_wins_over_value() {
        let sample = ProbeSample {
            celsius_x10: 600,
            fault: true,
        };
        assert_eq!(normalize(sample, &cfg()), Err(SensorFault::Flagged));
    }

    #[test]
    fn test_threshold_helpers() {
        let r = TemperatureReading(650);
        assert!(r.at_least_c(65));
        assert!(!r.at_least_c(66));
        assert!(r.below_c(66));
        assert!(!r.above_c(65));
        assert!(r.above_c(64));
    }

    #[test]
    fn test_fault_edges() {
        let mut n = SensorNormalizer::new();
        assert_eq!(n.latest(ProbeId::Boiler), None);

        assert_eq!(n.update(ProbeId::Boiler, ProbeSample::ok(200), &cfg()), None);
        assert_eq!(
            n.update(ProbeId::Boiler, ProbeSample::faulted(), &cfg()),
            Some(FaultEdge::Raised(SensorFault::Flagged))
        );
        // Same fault again is not a new edge
        assert_eq!(n.update(ProbeId::Boiler, ProbeSample::faulted(), &cfg()), None);
        assert_eq!(n.fault(ProbeId::Boiler), Some(SensorFault::Flagged));
        assert_eq!(n.reading(ProbeId::Boiler), None);

        assert_eq!(
            n.update(ProbeId::Boiler, ProbeSample::ok(210), &cfg()),
            Some(FaultEdge::Cleared)
        );
        assert_eq!(n.reading(ProbeId::Boiler).map(|r| r.celsius_x10()), Some(210));
    }

    #[test]
    fn test_probes_independent() {
        let mut n = SensorNormalizer::new();
        n.update(ProbeId::Chimney, ProbeSample::ok(3000), &cfg());
        n.update(ProbeId::HotWater, ProbeSample::ok(450), &cfg());
        assert_eq!(n.fault(ProbeId::Chimney), Some(SensorFault::OutOfRange));
        assert!(n.reading(ProbeId::HotWater).is_some());
        assert_eq!(n.latest(ProbeId::Boiler), None);
    }
}
