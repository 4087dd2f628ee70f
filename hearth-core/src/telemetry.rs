//! Controller status snapshots
//!
//! A [`Telemetry`] value is a read-only copy of everything the panel and
//! the log show. It is converted to the wire [`StatusReport`] at the edge.

use hearth_protocol::{BurnerPhase, FaultCode, FlameState, StageCode, StatusReport};

use crate::control::{ActuatorCommand, RetryCounters};
use crate::flame::FlameStatus;
use crate::safety::{SafetyContact, SafetyStatus};
use crate::sensor::ProbeResult;
use crate::stage::FiringStage;
use crate::state::{CombustionState, FaultReason, OperatingMode, ShutdownPhase, StartupPhase};

/// Snapshot of the burner at the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    pub uptime_ms: u32,
    pub state: CombustionState,
    pub flame: FlameStatus,
    pub flame_average: Option<u16>,
    pub safety: SafetyStatus,
    pub counters: RetryCounters,
    /// `None` until the probe has been read once
    pub boiler: Option<ProbeResult>,
    pub hot_water: Option<ProbeResult>,
    pub chimney: Option<ProbeResult>,
    pub chimney_warning: bool,
    pub hot_water_call: bool,
    pub command: ActuatorCommand,
    pub mode: OperatingMode,
    pub stalled_lines: u8,
    pub faulted_lines: u8,
    pub jam_pulses: u8,
    pub jam_blocks: u8,
}

impl Telemetry {
    /// Wire representation for the panel display
    pub fn to_report(&self) -> StatusReport {
        StatusReport {
            uptime_ms: self.uptime_ms,
            phase: phase_code(&self.state),
            stage: self.state.stage().map(stage_code),
            fault: self.state.fault_reason().map(fault_code),
            safety_trip: match self.safety {
                SafetyStatus::Tripped(contact) => Some(contact_code(contact)),
                SafetyStatus::Clear => None,
            },
            flame: match self.flame {
                FlameStatus::Unproven => FlameState::Unproven,
                FlameStatus::Proven => FlameState::Proven,
                FlameStatus::Lost => FlameState::Lost,
            },
            flame_average: self.flame_average.unwrap_or(0),
            boiler_x10: celsius_x10(self.boiler),
            hot_water_x10: celsius_x10(self.hot_water),
            chimney_x10: celsius_x10(self.chimney),
            chimney_warning: self.chimney_warning,
            auto_mode: self.mode == OperatingMode::Auto,
            feeder: self.command.feeder,
            fan_power: self.command.fan_power,
            hot_water_pump: self.command.hot_water_pump,
            central_heating_pump: self.command.central_heating_pump,
            stalled_lines: self.stalled_lines,
            faulted_lines: self.faulted_lines,
            startup_retries: self.counters.startup_retries,
            run_restarts: self.counters.run_restarts,
            jam_pulses: self.jam_pulses,
            jam_blocks: self.jam_blocks,
        }
    }
}

fn celsius_x10(result: Option<ProbeResult>) -> Option<i16> {
    match result {
        Some(Ok(reading)) => Some(reading.celsius_x10()),
        _ => None,
    }
}

fn phase_code(state: &CombustionState) -> BurnerPhase {
    match state {
        CombustionState::Idle => BurnerPhase::Idle,
        CombustionState::Startup(StartupPhase::Purge) => BurnerPhase::Purge,
        CombustionState::Startup(StartupPhase::Feed) => BurnerPhase::Feed,
        CombustionState::Startup(StartupPhase::Prove) => BurnerPhase::Prove,
        CombustionState::Startup(StartupPhase::RetryDelay) => BurnerPhase::RetryDelay,
        CombustionState::Running(_) => BurnerPhase::Running,
        CombustionState::Jam { .. } => BurnerPhase::Jam,
        CombustionState::Shutdown(ShutdownPhase::Overrun) => BurnerPhase::Overrun,
        CombustionState::Shutdown(ShutdownPhase::PostPurge) => BurnerPhase::PostPurge,
        CombustionState::Fault(_) => BurnerPhase::Fault,
    }
}

fn stage_code(stage: FiringStage) -> StageCode {
    match stage {
        FiringStage::Low => StageCode::Low,
        FiringStage::Med => StageCode::Med,
        FiringStage::High => StageCode::High,
    }
}

fn contact_code(contact: SafetyContact) -> FaultCode {
    match contact {
        SafetyContact::EStop => FaultCode::EStop,
        SafetyContact::HighLimit => FaultCode::HighLimit,
        SafetyContact::Backfire => FaultCode::Backfire,
    }
}

fn fault_code(reason: FaultReason) -> FaultCode {
    match reason {
        FaultReason::Safety(contact) => contact_code(contact),
        FaultReason::IgnitionFailed => FaultCode::IgnitionFailed,
        FaultReason::FlameLoss => FaultCode::FlameLoss,
        FaultReason::JamUnresolved => FaultCode::JamUnresolved,
    }
}
