//! PWM combustion fan
//!
//! The fan speed controller takes a PWM signal; power is commanded in
//! percent and mapped onto the channel's duty range.

use embedded_hal::pwm::SetDutyCycle;
use hearth_core::config::FAN_POWER_MAX;
use hearth_core::traits::FanOutput;

/// Fan on a PWM channel
pub struct PwmFan<P> {
    pwm: P,
    /// Last commanded power (0-100%)
    power: u8,
    write_failed: bool,
}

impl<P: SetDutyCycle> PwmFan<P> {
    /// Create a fan output, stopped
    pub fn new(pwm: P) -> Self {
        let mut fan = Self {
            pwm,
            power: 0,
            write_failed: false,
        };
        fan.set_power(0);
        fan
    }

    /// The last duty write returned an error
    pub fn write_failed(&self) -> bool {
        self.write_failed
    }
}

impl<P: SetDutyCycle> FanOutput for PwmFan<P> {
    fn set_power(&mut self, percent: u8) {
        let percent = percent.min(FAN_POWER_MAX);
        self.write_failed = self.pwm.set_duty_cycle_percent(percent).is_err();
        self.power = percent;
    }

    fn power(&self) -> u8 {
        self.power
    }
}
