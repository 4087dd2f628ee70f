//! NTC 10K boiler probes
//!
//! Immersion and flue probes on boiler panels are 10K B3950 thermistors
//! in a divider with a fixed pull-up. Uses a lookup table for
//! integer-only temperature calculation.

use hearth_core::traits::{SensorError, TemperatureSensor};

use super::{AdcReader, ADC_MAX};

/// NTC 10K thermistor temperature lookup table
///
/// Table format: (resistance_ohms, temperature_x10)
/// Generated using beta equation with:
/// - R0 = 10,000 ohms at T0 = 25°C
/// - Beta = 3950K
///
/// Temperature range: -40°C to 150°C
const TEMP_TABLE: &[(u32, i16)] = &[
    (401_860, -400),
    (200_204, -300),
    (105_385, -200),
    (58_246, -100),
    (33_621, 0),
    (20_175, 100),
    (12_535, 200),
    (8_037, 300),
    (5_301, 400),
    (3_588, 500),
    (2_486, 600), // hot water target band
    (1_760, 700),
    (1_270, 800), // boiler high stage
    (934, 900),
    (698, 1000),
    (529, 1100),
    (407, 1200),
    (317, 1300), // dirty chimney
    (250, 1400),
    (200, 1500),
];

/// ADC counts near either rail mean a broken or shorted probe
const RAIL_MARGIN: u16 = 10;

/// Divider geometry and thermistor curve
///
/// Circuit: VCC -- pullup -- ADC_PIN -- NTC -- GND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NtcCurve {
    /// Pull-up resistor value in ohms
    pub pullup_ohms: u32,
}

impl Default for NtcCurve {
    fn default() -> Self {
        Self {
            pullup_ohms: 10_000,
        }
    }
}

impl NtcCurve {
    pub const fn new(pullup_ohms: u32) -> Self {
        Self { pullup_ohms }
    }

    /// Convert ADC reading to resistance
    ///
    /// R_ntc = R_pullup * adc_value / (adc_max - adc_value)
    pub fn adc_to_resistance(&self, adc_value: u16) -> Result<u32, SensorError> {
        if adc_value >= ADC_MAX - RAIL_MARGIN {
            return Err(SensorError::OpenCircuit);
        }
        if adc_value < RAIL_MARGIN {
            return Err(SensorError::ShortCircuit);
        }

        let numerator = self.pullup_ohms as u64 * adc_value as u64;
        let denominator = (ADC_MAX - adc_value) as u64;
        Ok((numerator / denominator) as u32)
    }

    /// Calculate temperature from resistance using the lookup table
    ///
    /// Returns temperature in 0.1°C units, linearly interpolated between
    /// table entries.
    pub fn resistance_to_temp_x10(resistance: u32) -> Result<i16, SensorError> {
        // Table is sorted by decreasing resistance (increasing temperature)
        TEMP_TABLE
            .windows(2)
            .find_map(|pair| {
                let (r_high, t_low) = pair[0];
                let (r_low, t_high) = pair[1];
                if resistance > r_high || resistance < r_low {
                    return None;
                }
                let r_range = (r_high - r_low) as i32;
                let t_range = (t_high - t_low) as i32;
                let r_offset = (r_high - resistance) as i32;
                Some(t_low + (t_range * r_offset / r_range) as i16)
            })
            .ok_or(SensorError::OutOfRange)
    }

    /// ADC counts to temperature in 0.1°C units
    pub fn celsius_x10(&self, adc_value: u16) -> Result<i16, SensorError> {
        Self::resistance_to_temp_x10(self.adc_to_resistance(adc_value)?)
    }
}

/// NTC probe on its own ADC channel
pub struct NtcSensor<ADC> {
    adc: ADC,
    curve: NtcCurve,
}

impl<ADC> NtcSensor<ADC> {
    pub fn new(adc: ADC, curve: NtcCurve) -> Self {
        Self { adc, curve }
    }
}

impl<ADC: AdcReader> TemperatureSensor for NtcSensor<ADC> {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        let adc_value = self.adc.read().map_err(|_| SensorError::ConversionError)?;
        self.curve.celsius_x10(adc_value)
    }
}

#[cfg(test)]
pub(crate) struct DummyAdc(pub Option<u16>);

#[cfg(test)]
impl AdcReader for DummyAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.0.ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistance_to_temp() {
        assert_eq!(NtcCurve::resistance_to_temp_x10(33_621), Ok(0));
        assert_eq!(NtcCurve::resistance_to_temp_x10(200), Ok(1500));

        // 10K ohms ≈ 25°C
        let temp = NtcCurve::resistance_to_temp_x10(10_000).unwrap();
        assert!((temp - 250).abs() < 10);

        // 2K ohms ≈ 67°C
        let temp = NtcCurve::resistance_to_temp_x10(2_000).unwrap();
        assert!((temp - 670).abs() < 20);
    }

    #[test]
    fn test_beyond_table() {
        assert_eq!(
            NtcCurve::resistance_to_temp_x10(500_000),
            Err(SensorError::OutOfRange)
        );
        assert_eq!(
            NtcCurve::resistance_to_temp_x10(150),
            Err(SensorError::OutOfRange)
        );
    }

    #[test]
    fn test_midscale_is_pullup_value() {
        let curve = NtcCurve::default();
        assert_eq!(curve.adc_to_resistance(2048), Ok(10_000));
    }

    #[test]
    fn test_open_and_short_circuit() {
        let curve = NtcCurve::default();
        assert_eq!(curve.adc_to_resistance(4095), Err(SensorError::OpenCircuit));
        assert_eq!(curve.adc_to_resistance(0), Err(SensorError::ShortCircuit));
    }

    #[test]
    fn test_sensor_sample() {
        let mut probe = NtcSensor::new(DummyAdc(Some(2048)), NtcCurve::default());
        let sample = probe.sample();
        assert!(!sample.fault);
        assert!((sample.celsius_x10 - 250).abs() < 10);

        let mut broken = NtcSensor::new(DummyAdc(None), NtcCurve::default());
        assert_eq!(broken.read_celsius_x10(), Err(SensorError::ConversionError));
        assert!(broken.sample().fault);
    }
}
