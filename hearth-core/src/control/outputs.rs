//! Actuator output computation
//!
//! Outputs depend only on the combustion state, the time spent in the
//! current phase and a few flags the burner derives itself. Nothing here
//! looks at sensor inputs directly.

use crate::config::{BurnerConfig, FanPower};
use crate::stall::JamPhase;
use crate::state::{CombustionState, ShutdownPhase, StartupPhase};

/// Actuator command for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorCommand {
    pub feeder: bool,
    /// Fan power in percent (0-100)
    pub fan_power: FanPower,
    pub hot_water_pump: bool,
    pub central_heating_pump: bool,
}

impl ActuatorCommand {
    /// Everything off
    pub const OFF: Self = Self {
        feeder: false,
        fan_power: 0,
        hot_water_pump: false,
        central_heating_pump: false,
    };
}

/// Flags owned by the burner that shape the outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputContext {
    /// Boiler probe faulted; running fan drops to the degraded power
    pub boiler_degraded: bool,
    /// Hot water cylinder wants heat
    pub hot_water_call: bool,
    /// A safety lockout interrupted a pump overrun that is still due; the
    /// pumps keep circulating in any state until its deadline
    pub held_overrun: bool,
}

/// Compute the outputs for a state
///
/// `elapsed_ms` is the time spent in the current phase. For `Running` it
/// is the position inside the feeder duty cycle; for `Jam` it is the
/// progress of the interrupted state, which keeps deciding fan and pumps.
pub fn compute(
    state: &CombustionState,
    elapsed_ms: u32,
    ctx: &OutputContext,
    config: &BurnerConfig,
) -> ActuatorCommand {
    let fan = &config.fan;
    let (feeder, fan_power) = match *state {
        CombustionState::Idle | CombustionState::Fault(_) => (false, fan.idle),
        CombustionState::Startup(StartupPhase::Purge) => (false, fan.startup_purge),
        CombustionState::Startup(StartupPhase::Feed) => (true, fan.startup_feed),
        CombustionState::Startup(StartupPhase::Prove) => (false, fan.startup_prove),
        CombustionState::Startup(StartupPhase::RetryDelay) => (false, fan.restart_delay),
        CombustionState::Running(stage) => {
            let profile = config.stages.profile(stage);
            let cycle = profile.cycle_ms().max(1);
            let feeder = elapsed_ms % cycle < profile.feeder_on_ms;
            let power = if ctx.boiler_degraded {
                fan.degraded
            } else {
                profile.fan_power
            };
            (feeder, power)
        }
        CombustionState::Jam { phase, resume } => {
            let underlying = compute(&resume.state(), elapsed_ms, ctx, config);
            (phase == JamPhase::PulseOn, underlying.fan_power)
        }
        CombustionState::Shutdown(ShutdownPhase::Overrun) => (false, fan.shutdown_overrun),
        CombustionState::Shutdown(ShutdownPhase::PostPurge) => (false, fan.shutdown_post_purge),
    };

    let circulating = ctx.held_overrun
        || matches!(
            state,
            CombustionState::Running(_)
                | CombustionState::Jam { .. }
                | CombustionState::Shutdown(ShutdownPhase::Overrun)
        );

    ActuatorCommand {
        feeder,
        fan_power,
        hot_water_pump: circulating && ctx.hot_water_call,
        central_heating_pump: circulating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::SafetyContact;
    use crate::stage::FiringStage;
    use crate::state::{FaultReason, Resume};

    fn out(state: CombustionState, elapsed: u32, ctx: OutputContext) -> ActuatorCommand {
        compute(&state, elapsed, &ctx, &BurnerConfig::default())
    }

    #[test]
    fn test_startup_phases() {
        let ctx = OutputContext::default();
        let purge = out(CombustionState::Startup(StartupPhase::Purge), 0, ctx);
        assert_eq!((purge.feeder, purge.fan_power), (false, 100));
        let feed = out(CombustionState::Startup(StartupPhase::Feed), 0, ctx);
        assert_eq!((feed.feeder, feed.fan_power), (true, 85));
        let prove = out(CombustionState::Startup(StartupPhase::Prove), 0, ctx);
        assert_eq!((prove.feeder, prove.fan_power), (false, 70));
        assert!(!prove.central_heating_pump);
    }

    #[test]
    fn test_running_duty_cycle() {
        let ctx = OutputContext::default();
        let low = CombustionState::Running(FiringStage::Low);
        assert!(out(low, 0, ctx).feeder);
        assert!(out(low, 1_999, ctx).feeder);
        assert!(!out(low, 2_000, ctx).feeder);
        assert!(!out(low, 31_999, ctx).feeder);
        assert_eq!(out(low, 0, ctx).fan_power, 80);
        assert!(out(low, 0, ctx).central_heating_pump);
    }

    #[test]
    fn test_degraded_fan() {
        let ctx = OutputContext {
            boiler_degraded: true,
            ..Default::default()
        };
        let cmd = out(CombustionState::Running(FiringStage::High), 0, ctx);
        assert_eq!(cmd.fan_power, 20);
    }

    #[test]
    fn test_jam_overrides_feeder_only() {
        let ctx = OutputContext {
            hot_water_call: true,
            ..Default::default()
        };
        let jam = CombustionState::Jam {
            phase: JamPhase::PulseOff,
            resume: Resume::Running(FiringStage::Med),
        };
        let cmd = out(jam, 0, ctx);
        assert!(!cmd.feeder);
        assert_eq!(cmd.fan_power, 60);
        assert!(cmd.hot_water_pump && cmd.central_heating_pump);

        let pulse = CombustionState::Jam {
            phase: JamPhase::PulseOn,
            resume: Resume::Startup(StartupPhase::Purge),
        };
        let cmd = out(pulse, 0, ctx);
        assert!(cmd.feeder);
        assert_eq!(cmd.fan_power, 100);
    }

    #[test]
    fn test_fault_outputs() {
        let fault = CombustionState::Fault(FaultReason::Safety(SafetyContact::EStop));
        assert_eq!(out(fault, 0, OutputContext::default()), ActuatorCommand::OFF);

        let held = OutputContext {
            held_overrun: true,
            hot_water_call: true,
            ..Default::default()
        };
        let cmd = out(fault, 0, held);
        assert!(!cmd.feeder);
        assert_eq!(cmd.fan_power, 0);
        assert!(cmd.central_heating_pump && cmd.hot_water_pump);
    }

    #[test]
    fn test_held_overrun_outlives_fault() {
        let held = OutputContext {
            held_overrun: true,
            ..Default::default()
        };
        let idle = out(CombustionState::Idle, 0, held);
        assert!(idle.central_heating_pump);
        assert!(!idle.feeder);
        assert_eq!(idle.fan_power, 0);
        assert_eq!(
            out(CombustionState::Idle, 0, OutputContext::default()),
            ActuatorCommand::OFF
        );
    }

    #[test]
    fn test_shutdown() {
        let ctx = OutputContext::default();
        let overrun = out(CombustionState::Shutdown(ShutdownPhase::Overrun), 0, ctx);
        assert_eq!(overrun.fan_power, 30);
        assert!(overrun.central_heating_pump);
        assert!(!overrun.hot_water_pump);
        let post = out(CombustionState::Shutdown(ShutdownPhase::PostPurge), 0, ctx);
        assert_eq!(post.fan_power, 80);
        assert!(!post.central_heating_pump);
    }
}
