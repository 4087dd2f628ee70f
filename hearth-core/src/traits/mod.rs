//! Hardware abstraction traits
//!
//! These traits define the interface between the burner logic and
//! board-specific implementations.

pub mod inputs;
pub mod outputs;

pub use inputs::{ContactId, InputSource, SensorError, TemperatureSensor};
pub use outputs::{Actuators, FanOutput, SwitchOutput};
