//! Burner events and operator commands

use hearth_protocol::PanelInput;

use super::machine::{CombustionState, FaultReason};
use crate::safety::SafetyContact;
use crate::sensor::{ProbeId, SensorFault};
use crate::stage::FiringStage;

/// Something that happened during a tick, reported for logging and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    StateChanged {
        from: CombustionState,
        to: CombustionState,
    },
    /// Flame held stable through proving
    FlameProven,
    /// Proving window ran out (`attempt` counts failed ignitions this cycle)
    ProveTimeout { attempt: u8 },
    /// Flame loss confirmed while running (`restart` counts losses this cycle)
    FlameLost { restart: u8 },
    StageChanged { from: FiringStage, to: FiringStage },
    /// Jam clearing started; bit `n` of `lines` is feed line `n`
    JamEntered { lines: u8 },
    /// Every stall cleared; the interrupted state resumes
    JamCleared,
    SafetyTripped(SafetyContact),
    /// Interlock released by an operator reset
    SafetyReset,
    FaultLatched(FaultReason),
    /// Lockout left by an operator reset
    FaultCleared,
    /// Flue gas over the dirty-chimney threshold
    ChimneyWarning,
    ChimneyWarningCleared,
    SensorFault { probe: ProbeId, fault: SensorFault },
    SensorRecovered(ProbeId),
    ModeChanged(OperatingMode),
}

impl Event {
    /// Check if this event needs operator attention
    pub fn is_alarm(&self) -> bool {
        matches!(
            self,
            Event::SafetyTripped(_)
                | Event::FaultLatched(_)
                | Event::JamEntered { .. }
                | Event::ChimneyWarning
                | Event::SensorFault { .. }
        )
    }
}

/// Panel mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Follow heat demand
    #[default]
    Auto,
    /// Demand ignored; the burner shuts down and stays idle
    Off,
}

/// What an operator reset applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetTarget {
    /// Interlock, feed line latches and burner lockout together
    All,
    /// Safety interlock latch
    Safety,
    /// Burner lockout
    Burner,
    /// Fault latch of one feed line
    Line(u8),
}

/// Operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Reset(ResetTarget),
    SetMode(OperatingMode),
}

impl From<PanelInput> for Command {
    fn from(input: PanelInput) -> Self {
        match input {
            PanelInput::ResetAll => Command::Reset(ResetTarget::All),
            PanelInput::ResetSafety => Command::Reset(ResetTarget::Safety),
            PanelInput::ResetBurner => Command::Reset(ResetTarget::Burner),
            PanelInput::ResetLine(line) => Command::Reset(ResetTarget::Line(line)),
            PanelInput::ModeAuto => Command::SetMode(OperatingMode::Auto),
            PanelInput::ModeOff => Command::SetMode(OperatingMode::Off),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_input_mapping() {
        assert_eq!(
            Command::from(PanelInput::ResetLine(3)),
            Command::Reset(ResetTarget::Line(3))
        );
        assert_eq!(
            Command::from(PanelInput::ModeOff),
            Command::SetMode(OperatingMode::Off)
        );
    }

    #[test]
    fn test_alarm_classification() {
        assert!(Event::SafetyTripped(SafetyContact::EStop).is_alarm());
        assert!(!Event::FlameProven.is_alarm());
        assert!(!Event::JamCleared.is_alarm());
    }
}
