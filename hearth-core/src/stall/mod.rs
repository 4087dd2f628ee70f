//! Feed line stall detection and jam clearing

pub mod jam;
pub mod monitor;

pub use jam::{JamHandler, JamPhase, JamStep};
pub use monitor::{StallLevels, StallMonitor};
