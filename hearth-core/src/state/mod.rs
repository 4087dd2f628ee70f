//! Combustion state machine types
//!
//! The state is explicit, finite, and owned by exactly one
//! [`Burner`](crate::control::Burner).

pub mod events;
pub mod machine;

pub use events::{Command, Event, OperatingMode, ResetTarget};
pub use machine::{CombustionState, FaultReason, Resume, ShutdownPhase, StartupPhase};
