//! Analog sensor drivers

pub mod flame;
pub mod ntc;

pub use flame::FlameSensor;
pub use ntc::{NtcCurve, NtcSensor};

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Full scale of the 12-bit ADC
pub const ADC_MAX: u16 = 4096;
