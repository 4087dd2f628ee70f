//! Input traits: probes, contacts, demand and flame sensor

use crate::safety::SafetyContact;
use crate::sensor::{ProbeId, ProbeSample};

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted to ground
    ShortCircuit,
    /// Reading outside the sensor's calibrated range
    OutOfRange,
    /// ADC conversion error
    ConversionError,
}

/// Trait for temperature sensors
///
/// Implementations handle the specific probe type (NTC thermistor,
/// thermocouple...).
pub trait TemperatureSensor {
    /// Read the current temperature
    ///
    /// Returns a fixed-point value with 0.1°C resolution.
    /// For example, 45.5°C is returned as 455.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;

    /// Read as a probe sample, folding errors into the fault flag
    fn sample(&mut self) -> ProbeSample {
        match self.read_celsius_x10() {
            Ok(x10) => ProbeSample::ok(x10),
            Err(_) => ProbeSample::faulted(),
        }
    }
}

/// Digital contact inputs read by the burner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContactId {
    Safety(SafetyContact),
    /// Stall contact of feed line `n`
    Stall(u8),
}

/// Everything the burner reads once per tick
///
/// Contact and demand reads return the raw electrical level (`true` =
/// high). Polarity is applied by the burner from the panel configuration.
pub trait InputSource {
    fn read_temperature(&mut self, probe: ProbeId) -> ProbeSample;

    /// Raw heat demand input level
    fn read_demand(&mut self) -> bool;

    /// Raw flame sensor value (ADC counts)
    fn read_flame_raw(&mut self) -> u16;

    /// Raw contact level
    fn read_contact(&mut self, contact: ContactId) -> bool;
}
