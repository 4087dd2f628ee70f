//! Burner control
//!
//! The orchestrator, its retry budgets and the pure output mapping.

pub mod burner;
pub mod counters;
pub mod outputs;

pub use burner::{Burner, Events, Inputs, TickReport, MAX_EVENTS};
pub use counters::RetryCounters;
pub use outputs::{ActuatorCommand, OutputContext};
