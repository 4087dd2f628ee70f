//! Board-agnostic combustion control for solid-fuel boiler panels
//!
//! This crate contains all burner logic that does not depend on
//! specific hardware implementations:
//!
//! - Sensor normalization (probe range checks)
//! - Flame monitoring (rolling average + proving / loss debounce)
//! - Safety interlock (E-stop, high-limit, backfire contacts)
//! - Stall detection and jam clearing
//! - Firing stage selection
//! - The combustion state machine that owns every actuator output
//! - Configuration types and the `panel.toml` parser
//! - Hardware abstraction traits and telemetry snapshots

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod flame;
pub mod safety;
pub mod sensor;
pub mod stage;
pub mod stall;
pub mod state;
pub mod telemetry;
pub mod time;
pub mod traits;

pub use control::{ActuatorCommand, Burner, Inputs, TickReport};
pub use state::{CombustionState, Event, FaultReason};
