//! Output drivers

pub mod fan;
pub mod panel;
pub mod relay;

pub use fan::PwmFan;
pub use panel::PanelActuators;
pub use relay::Relay;
