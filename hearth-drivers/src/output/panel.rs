//! The panel's actuator set

use hearth_core::traits::{Actuators, FanOutput, SwitchOutput};

/// Feeder, fan and pump outputs behind one [`Actuators`] implementation
pub struct PanelActuators<S, F> {
    pub feeder: S,
    pub fan: F,
    pub hot_water_pump: S,
    pub central_heating_pump: S,
}

impl<S: SwitchOutput, F: FanOutput> PanelActuators<S, F> {
    pub fn new(feeder: S, fan: F, hot_water_pump: S, central_heating_pump: S) -> Self {
        Self {
            feeder,
            fan,
            hot_water_pump,
            central_heating_pump,
        }
    }

    /// Drop every output to its safe state
    pub fn all_off(&mut self) {
        self.feeder.set_on(false);
        self.fan.set_power(0);
        self.hot_water_pump.set_on(false);
        self.central_heating_pump.set_on(false);
    }
}

impl<S: SwitchOutput, F: FanOutput> Actuators for PanelActuators<S, F> {
    fn set_feeder(&mut self, on: bool) {
        self.feeder.set_on(on);
    }

    fn set_fan_power(&mut self, percent: u8) {
        self.fan.set_power(percent);
    }

    fn set_pumps(&mut self, hot_water: bool, central_heating: bool) {
        self.hot_water_pump.set_on(hot_water);
        self.central_heating_pump.set_on(central_heating);
    }
}
