//! Combustion state definition
//!
//! Every actuator output is a function of the current state and the time
//! spent in it. The transitions themselves live in
//! [`Burner`](crate::control::Burner), which owns the single state value.

use crate::safety::SafetyContact;
use crate::stage::FiringStage;
use crate::stall::JamPhase;

/// Ignition sequence phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupPhase {
    /// Fan clears the combustion chamber
    Purge,
    /// Feeder loads the ignition charge
    Feed,
    /// Waiting for stable flame
    Prove,
    /// Rest before another ignition attempt
    RetryDelay,
}

/// Shutdown sequence phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutdownPhase {
    /// Pumps carry residual heat away
    Overrun,
    /// Fan burns out and clears the chamber
    PostPurge,
}

/// State a jam interrupted and will resume on clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resume {
    Startup(StartupPhase),
    Running(FiringStage),
}

impl Resume {
    /// The interrupted state
    pub const fn state(self) -> CombustionState {
        match self {
            Resume::Startup(phase) => CombustionState::Startup(phase),
            Resume::Running(stage) => CombustionState::Running(stage),
        }
    }
}

/// Why the burner locked out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultReason {
    /// A safety chain contact tripped
    Safety(SafetyContact),
    /// Ignition retries exhausted
    IgnitionFailed,
    /// Flame restarts exhausted
    FlameLoss,
    /// Jam clearing exhausted
    JamUnresolved,
}

/// Combustion states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CombustionState {
    /// No demand; everything off
    #[default]
    Idle,
    Startup(StartupPhase),
    Running(FiringStage),
    /// Clearing a stalled feed line
    Jam { phase: JamPhase, resume: Resume },
    Shutdown(ShutdownPhase),
    /// Locked out until reset
    Fault(FaultReason),
}

impl CombustionState {
    /// Check if fuel may be fed in this state
    pub fn feeding_allowed(&self) -> bool {
        matches!(
            self,
            CombustionState::Startup(StartupPhase::Feed)
                | CombustionState::Running(_)
                | CombustionState::Jam { .. }
        )
    }

    /// Check if the burner is lit or being lit
    pub fn is_firing(&self) -> bool {
        matches!(
            self,
            CombustionState::Startup(_) | CombustionState::Running(_) | CombustionState::Jam { .. }
        )
    }

    /// Check if stall contacts trigger jam clearing in this state
    pub fn jam_eligible(&self) -> bool {
        matches!(self, CombustionState::Startup(_) | CombustionState::Running(_))
    }

    /// Check if this is a lockout state
    pub fn is_fault(&self) -> bool {
        matches!(self, CombustionState::Fault(_))
    }

    pub fn fault_reason(&self) -> Option<FaultReason> {
        match self {
            CombustionState::Fault(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Firing stage, including one preserved by a jam
    pub fn stage(&self) -> Option<FiringStage> {
        match self {
            CombustionState::Running(stage)
            | CombustionState::Jam {
                resume: Resume::Running(stage),
                ..
            } => Some(*stage),
            _ => None,
        }
    }
}
