//! Flame photo sensor
//!
//! A photoresistor or photodiode amplifier watching the fire through the
//! burner sight glass. Brighter flame gives a higher ADC count; the burner
//! averages and thresholds the raw value itself.

use super::AdcReader;

/// Flame sensor on an ADC channel
pub struct FlameSensor<ADC> {
    adc: ADC,
    /// Sensor wired so that light pulls the reading down
    inverted: bool,
}

impl<ADC: AdcReader> FlameSensor<ADC> {
    pub fn new(adc: ADC) -> Self {
        Self {
            adc,
            inverted: false,
        }
    }

    pub fn new_inverted(adc: ADC) -> Self {
        Self {
            adc,
            inverted: true,
        }
    }

    /// Brightness in ADC counts; a failed conversion reads as darkness
    pub fn read_raw(&mut self) -> u16 {
        match self.adc.read() {
            Ok(value) => brightness(value, self.inverted),
            Err(()) => 0,
        }
    }
}

/// Normalize a reading so that more light is always a higher value
pub fn brightness(adc_value: u16, inverted: bool) -> u16 {
    let value = adc_value.min(super::ADC_MAX - 1);
    if inverted {
        super::ADC_MAX - 1 - value
    } else {
        value
    }
}
