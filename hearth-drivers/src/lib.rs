//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in hearth-core for the panel's hardware:
//!
//! - Relay outputs (feeder, pumps) over `embedded-hal` output pins
//! - PWM combustion fan
//! - Dry-contact inputs (safety chain, stall switches, room thermostat)
//! - NTC boiler probes and the flame photo sensor over a raw ADC
//! - The aggregated actuator set driven by the burner

#![no_std]
#![deny(unsafe_code)]

pub mod input;
pub mod output;
pub mod sensor;

pub use input::Contact;
pub use output::{PanelActuators, PwmFan, Relay};
pub use sensor::{AdcReader, FlameSensor, NtcCurve, NtcSensor};
