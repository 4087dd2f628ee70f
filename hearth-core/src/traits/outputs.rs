//! Output traits: relays, fan and the aggregated actuator set

use crate::control::ActuatorCommand;

/// On/off output (relay, SSR, contactor coil)
pub trait SwitchOutput {
    /// Energize or release the output
    fn set_on(&mut self, on: bool);

    /// Check if the output is currently energized
    fn is_on(&self) -> bool;
}

/// Variable-speed fan output
pub trait FanOutput {
    /// Set fan power in percent; values above 100 are clamped
    fn set_power(&mut self, percent: u8);

    /// Last commanded power
    fn power(&self) -> u8;
}

/// All burner actuators, driven once per tick
pub trait Actuators {
    fn set_feeder(&mut self, on: bool);

    /// Fan power in percent (0-100)
    fn set_fan_power(&mut self, percent: u8);

    fn set_pumps(&mut self, hot_water: bool, central_heating: bool);

    /// Drive every output from a command
    fn apply(&mut self, command: &ActuatorCommand) {
        self.set_feeder(command.feeder);
        self.set_fan_power(command.fan_power);
        self.set_pumps(command.hot_water_pump, command.central_heating_pump);
    }
}
