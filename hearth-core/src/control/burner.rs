//! Burner orchestration
//!
//! [`Burner`] owns the single [`CombustionState`] and every monitor that
//! feeds it. Each tick runs the same priority pipeline:
//!
//! 1. Sense: normalize probes, debounce stall contacts, sample the flame
//! 2. Safety: a tripped interlock locks out and ends the tick
//! 3. Jam: a stalled feed line takes over the feeder until it clears
//! 4. State: the normal combustion sequence
//!
//! Actuator outputs are then computed from the resulting state alone.

use heapless::Vec;

use super::counters::RetryCounters;
use super::outputs::{self, ActuatorCommand, OutputContext};
use crate::config::{BurnerConfig, PanelConfig, MAX_STALL_LINES};
use crate::flame::{FlameEvent, FlameMonitor, FlameStatus};
use crate::safety::{ContactLevels, SafetyContact, SafetyInterlock, SafetyStatus};
use crate::sensor::{FaultEdge, ProbeId, ProbeSample, SensorNormalizer};
use crate::stage::{self, FiringStage, StageTarget};
use crate::stall::{JamHandler, JamStep, StallLevels, StallMonitor};
use crate::state::{
    Command, CombustionState, Event, FaultReason, OperatingMode, ResetTarget, Resume,
    ShutdownPhase, StartupPhase,
};
use crate::telemetry::Telemetry;
use crate::time::PhaseTimer;
use crate::traits::{Actuators, ContactId, InputSource};

/// Events a single tick can report
pub const MAX_EVENTS: usize = 16;

/// Event buffer of one tick
pub type Events = Vec<Event, MAX_EVENTS>;

/// Everything the burner reads in one tick
///
/// Contact and demand fields are raw pin levels; polarity comes from the
/// [`PanelConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    pub boiler: ProbeSample,
    pub hot_water: ProbeSample,
    pub chimney: ProbeSample,
    /// Raw heat demand level
    pub demand: bool,
    /// Raw flame sensor value
    pub flame_raw: u16,
    pub safety: ContactLevels,
    pub stalls: StallLevels,
}

impl Inputs {
    /// Room temperature probes, no demand, no flame, every contact clear
    pub fn quiescent(panel: &PanelConfig) -> Self {
        let mut stalls = [false; MAX_STALL_LINES];
        for (level, line) in stalls.iter_mut().zip(panel.stall_lines.iter()) {
            *level = line.polarity.level_for(false);
        }
        Self {
            boiler: ProbeSample::ok(200),
            hot_water: ProbeSample::ok(200),
            chimney: ProbeSample::ok(200),
            demand: panel.demand.level_for(false),
            flame_raw: 0,
            safety: ContactLevels::clear_for(&panel.safety),
            stalls,
        }
    }

    /// Poll an input source
    pub fn read<S: InputSource>(source: &mut S, panel: &PanelConfig) -> Self {
        let mut stalls = [false; MAX_STALL_LINES];
        for (index, level) in stalls.iter_mut().enumerate().take(panel.stall_lines.len()) {
            *level = source.read_contact(ContactId::Stall(index as u8));
        }
        let mut safety = ContactLevels::default();
        for contact in SafetyContact::ALL {
            safety.set(contact, source.read_contact(ContactId::Safety(contact)));
        }
        Self {
            boiler: source.read_temperature(ProbeId::Boiler),
            hot_water: source.read_temperature(ProbeId::HotWater),
            chimney: source.read_temperature(ProbeId::Chimney),
            demand: source.read_demand(),
            flame_raw: source.read_flame_raw(),
            safety,
            stalls,
        }
    }

    pub fn probe(&self, probe: ProbeId) -> ProbeSample {
        match probe {
            ProbeId::Boiler => self.boiler,
            ProbeId::HotWater => self.hot_water,
            ProbeId::Chimney => self.chimney,
        }
    }

    /// Drive the demand input to read as `active`
    pub fn set_demand(&mut self, panel: &PanelConfig, active: bool) {
        self.demand = panel.demand.level_for(active);
    }

    /// Drive a safety contact to read as tripped or clear
    pub fn set_safety(&mut self, panel: &PanelConfig, contact: SafetyContact, tripped: bool) {
        let polarity = crate::safety::interlock::polarity(&panel.safety, contact);
        self.safety.set(contact, polarity.level_for(tripped));
    }

    /// Drive a feed line's stall contact to read as stalled or clear
    pub fn set_stall(&mut self, panel: &PanelConfig, line: usize, stalled: bool) {
        if let (Some(level), Some(config)) = (self.stalls.get_mut(line), panel.stall_lines.get(line)) {
            *level = config.polarity.level_for(stalled);
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub events: Events,
    pub command: ActuatorCommand,
}

/// A jam in progress and the state it interrupted
#[derive(Debug, Clone, Copy)]
struct JamEpisode {
    handler: JamHandler,
    resume: Resume,
    /// Progress of the interrupted phase when the jam began
    resume_elapsed_ms: u32,
}

/// Combustion controller
#[derive(Debug, Clone)]
pub struct Burner {
    config: BurnerConfig,
    panel: PanelConfig,
    state: CombustionState,
    /// Current phase, or current duty cycle while running
    timer: PhaseTimer,
    /// Stage to apply at the next duty cycle boundary
    pending_stage: Option<FiringStage>,
    sensors: SensorNormalizer,
    flame: FlameMonitor,
    safety: SafetyInterlock,
    stalls: StallMonitor,
    jam: Option<JamEpisode>,
    counters: RetryCounters,
    /// This heat cycle reached Running
    reached_running: bool,
    mode: OperatingMode,
    /// Demand asserted and mode Auto, as of the last tick
    demand: bool,
    hot_water_call: bool,
    chimney_warning: bool,
    /// Pump overrun interrupted by a safety lockout, kept until its deadline
    held_overrun: Option<PhaseTimer>,
    command: ActuatorCommand,
    events: Events,
    last_tick_ms: u32,
}

impl Burner {
    /// Create an idle burner
    pub fn new(config: BurnerConfig, panel: PanelConfig) -> Self {
        Self {
            config,
            panel,
            state: CombustionState::Idle,
            timer: PhaseTimer::start(0),
            pending_stage: None,
            sensors: SensorNormalizer::new(),
            flame: FlameMonitor::new(),
            safety: SafetyInterlock::new(),
            stalls: StallMonitor::new(),
            jam: None,
            counters: RetryCounters::new(),
            reached_running: false,
            mode: OperatingMode::Auto,
            demand: false,
            hot_water_call: false,
            chimney_warning: false,
            held_overrun: None,
            command: ActuatorCommand::OFF,
            events: Vec::new(),
            last_tick_ms: 0,
        }
    }

    pub fn state(&self) -> CombustionState {
        self.state
    }

    pub fn config(&self) -> &BurnerConfig {
        &self.config
    }

    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    pub fn counters(&self) -> RetryCounters {
        self.counters
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn flame_status(&self) -> FlameStatus {
        self.flame.status()
    }

    pub fn safety_status(&self) -> SafetyStatus {
        self.safety.status()
    }

    /// Outputs computed by the last tick
    pub fn command(&self) -> ActuatorCommand {
        self.command
    }

    /// Time spent in the current phase
    pub fn phase_elapsed(&self, now_ms: u32) -> u32 {
        self.timer.elapsed(now_ms)
    }

    /// Poll inputs, run one tick and drive the actuators
    pub fn run_tick<S, A>(&mut self, now_ms: u32, source: &mut S, actuators: &mut A) -> TickReport
    where
        S: InputSource,
        A: Actuators,
    {
        let inputs = Inputs::read(source, &self.panel);
        let report = self.tick(now_ms, &inputs);
        actuators.apply(&report.command);
        report
    }

    /// Run one control tick
    pub fn tick(&mut self, now_ms: u32, inputs: &Inputs) -> TickReport {
        self.last_tick_ms = now_ms;
        let flame_event = self.sense(now_ms, inputs);

        if !self.apply_safety(now_ms, &inputs.safety) && !self.apply_jam(now_ms) {
            self.step_state(now_ms, flame_event);
        }

        if let Some(overrun) = self.held_overrun {
            if overrun.expired(now_ms, self.config.shutdown.pump_overrun_ms) {
                self.held_overrun = None;
            }
        }

        self.command = self.outputs(now_ms);
        TickReport {
            events: core::mem::take(&mut self.events),
            command: self.command,
        }
    }

    /// Apply an operator command
    ///
    /// Returns whether the command took full effect. Events it causes are
    /// reported by the next tick.
    pub fn command_input(&mut self, command: Command, now_ms: u32) -> bool {
        match command {
            Command::SetMode(mode) => {
                if mode != self.mode {
                    self.mode = mode;
                    self.emit(Event::ModeChanged(mode));
                }
                true
            }
            Command::Reset(target) => self.reset(target, now_ms),
        }
    }

    /// Read-only snapshot for display and logging
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            uptime_ms: self.last_tick_ms,
            state: self.state,
            flame: self.flame.status(),
            flame_average: self.flame.average(),
            safety: self.safety.status(),
            counters: self.counters,
            boiler: self.sensors.latest(ProbeId::Boiler),
            hot_water: self.sensors.latest(ProbeId::HotWater),
            chimney: self.sensors.latest(ProbeId::Chimney),
            chimney_warning: self.chimney_warning,
            hot_water_call: self.hot_water_call,
            command: self.command,
            mode: self.mode,
            stalled_lines: self.stalls.stalled_mask(),
            faulted_lines: self.stalls.fault_mask(),
            jam_pulses: self.jam.map_or(0, |j| j.handler.pulses()),
            jam_blocks: self.jam.map_or(0, |j| j.handler.blocks()),
        }
    }

    fn emit(&mut self, event: Event) {
        // A full buffer keeps the earliest events of the tick
        let _ = self.events.push(event);
    }

    // ---- sensing -------------------------------------------------------

    fn sense(&mut self, now_ms: u32, inputs: &Inputs) -> Option<FlameEvent> {
        for probe in ProbeId::ALL {
            match self
                .sensors
                .update(probe, inputs.probe(probe), &self.config.temperature)
            {
                Some(FaultEdge::Raised(fault)) => self.emit(Event::SensorFault { probe, fault }),
                Some(FaultEdge::Cleared) => self.emit(Event::SensorRecovered(probe)),
                None => {}
            }
        }

        self.demand =
            self.panel.demand.is_active(inputs.demand) && self.mode == OperatingMode::Auto;

        self.stalls.update(
            now_ms,
            &inputs.stalls,
            &self.panel,
            self.config.stall.detect_ms,
        );

        self.update_hot_water_call();
        self.update_chimney_warning();

        self.flame.update(now_ms, inputs.flame_raw, &self.config.flame)
    }

    fn update_hot_water_call(&mut self) {
        let t = &self.config.temperature;
        self.hot_water_call = match self.sensors.reading(ProbeId::HotWater) {
            None => false,
            Some(reading) if self.hot_water_call => reading.below_c(t.hot_water_target_c),
            Some(reading) => {
                reading.below_c(t.hot_water_target_c - t.hot_water_hysteresis_c)
            }
        };
    }

    fn update_chimney_warning(&mut self) {
        let Some(reading) = self.sensors.reading(ProbeId::Chimney) else {
            return;
        };
        let dirty = stage::chimney_dirty(reading, &self.config.temperature);
        if dirty != self.chimney_warning {
            self.chimney_warning = dirty;
            self.emit(if dirty {
                Event::ChimneyWarning
            } else {
                Event::ChimneyWarningCleared
            });
        }
    }

    // ---- safety layer --------------------------------------------------

    /// Returns `true` while the interlock is tripped
    fn apply_safety(&mut self, now_ms: u32, levels: &ContactLevels) -> bool {
        if let Some(contact) = self.safety.evaluate(levels, &self.panel.safety) {
            self.emit(Event::SafetyTripped(contact));
            self.enter_fault(FaultReason::Safety(contact), now_ms);
        }
        self.safety.is_tripped()
    }

    // ---- jam layer -----------------------------------------------------

    /// Returns `true` when jam handling owns this tick
    fn apply_jam(&mut self, now_ms: u32) -> bool {
        match self.state {
            CombustionState::Jam { .. } => {
                self.step_jam(now_ms);
                true
            }
            state if state.jam_eligible() && self.stalls.any_stalled() => {
                self.enter_jam(now_ms);
                true
            }
            _ => false,
        }
    }

    fn enter_jam(&mut self, now_ms: u32) {
        let resume = match self.state {
            CombustionState::Startup(phase) => Resume::Startup(phase),
            CombustionState::Running(stage) => Resume::Running(stage),
            _ => return,
        };
        let handler = JamHandler::start(now_ms);
        self.jam = Some(JamEpisode {
            handler,
            resume,
            resume_elapsed_ms: self.timer.elapsed(now_ms),
        });
        self.enter(
            CombustionState::Jam {
                phase: handler.phase(),
                resume,
            },
            now_ms,
        );
        self.emit(Event::JamEntered {
            lines: self.stalls.stalled_mask(),
        });
    }

    fn step_jam(&mut self, now_ms: u32) {
        let Some(mut episode) = self.jam else {
            self.enter(CombustionState::Idle, now_ms);
            return;
        };

        if !self.demand {
            self.jam = None;
            self.enter(CombustionState::Shutdown(ShutdownPhase::Overrun), now_ms);
            return;
        }

        // Pulsing must not keep feeding a fire that went out
        if matches!(episode.resume, Resume::Running(_))
            && self.flame.status() == FlameStatus::Lost
        {
            self.jam = None;
            self.flame_lost(now_ms);
            return;
        }

        if !self.stalls.any_stalled() {
            self.resume_from_jam(&episode, now_ms);
            return;
        }

        match episode.handler.update(now_ms, &self.config.stall) {
            JamStep::Exhausted => {
                self.stalls.latch_faults();
                self.enter_fault(FaultReason::JamUnresolved, now_ms);
            }
            JamStep::Continue => {
                self.state = CombustionState::Jam {
                    phase: episode.handler.phase(),
                    resume: episode.resume,
                };
                self.jam = Some(episode);
            }
        }
    }

    fn resume_from_jam(&mut self, episode: &JamEpisode, now_ms: u32) {
        let from = self.state;
        let to = episode.resume.state();
        self.jam = None;
        self.state = to;
        self.timer = PhaseTimer::resume(now_ms, episode.resume_elapsed_ms);

        match episode.resume {
            Resume::Startup(StartupPhase::Prove) => {
                self.flame.begin_proving(self.timer.started_ms());
            }
            Resume::Running(_) => self.flame.begin_supervising(),
            Resume::Startup(_) => {}
        }

        self.emit(Event::JamCleared);
        self.emit(Event::StateChanged { from, to });
    }

    // ---- normal sequence -----------------------------------------------

    fn step_state(&mut self, now_ms: u32, flame_event: Option<FlameEvent>) {
        match self.state {
            CombustionState::Idle => {
                if self.demand {
                    self.enter(CombustionState::Startup(StartupPhase::Purge), now_ms);
                }
            }
            CombustionState::Startup(phase) => self.step_startup(phase, now_ms, flame_event),
            CombustionState::Running(stage) => self.step_running(stage, now_ms, flame_event),
            CombustionState::Shutdown(phase) => self.step_shutdown(phase, now_ms),
            // Jam is handled by its own layer; Fault waits for a reset
            CombustionState::Jam { .. } | CombustionState::Fault(_) => {}
        }
    }

    fn step_startup(&mut self, phase: StartupPhase, now_ms: u32, flame_event: Option<FlameEvent>) {
        if !self.demand {
            // Fuel may already be on the grate
            self.enter(CombustionState::Shutdown(ShutdownPhase::Overrun), now_ms);
            return;
        }

        let s = self.config.startup;
        match phase {
            StartupPhase::Purge => {
                if self.timer.expired(now_ms, s.purge_ms) {
                    self.enter(CombustionState::Startup(StartupPhase::Feed), now_ms);
                }
            }
            StartupPhase::Feed => {
                if self.timer.expired(now_ms, s.feed_ms) {
                    self.enter(CombustionState::Startup(StartupPhase::Prove), now_ms);
                }
            }
            StartupPhase::Prove => match flame_event {
                Some(FlameEvent::Proven) => {
                    self.emit(Event::FlameProven);
                    self.enter(CombustionState::Running(FiringStage::Low), now_ms);
                }
                Some(FlameEvent::ProveTimeout) => {
                    let retry = self.counters.record_prove_timeout(s.max_retries);
                    self.emit(Event::ProveTimeout {
                        attempt: self.counters.startup_retries,
                    });
                    if retry {
                        self.enter(CombustionState::Startup(StartupPhase::RetryDelay), now_ms);
                    } else {
                        self.enter_fault(FaultReason::IgnitionFailed, now_ms);
                    }
                }
                _ => {}
            },
            StartupPhase::RetryDelay => {
                if self.timer.expired(now_ms, s.retry_delay_ms) {
                    self.enter(CombustionState::Startup(StartupPhase::Purge), now_ms);
                }
            }
        }
    }

    fn step_running(&mut self, stage: FiringStage, now_ms: u32, flame_event: Option<FlameEvent>) {
        if !self.demand {
            self.enter(CombustionState::Shutdown(ShutdownPhase::Overrun), now_ms);
            return;
        }

        if flame_event == Some(FlameEvent::Lost) {
            self.flame_lost(now_ms);
            return;
        }

        let boiler = self.sensors.reading(ProbeId::Boiler);
        match stage::select(stage, boiler, self.demand, &self.config.temperature) {
            StageTarget::Stage(target) if target != stage => self.pending_stage = Some(target),
            StageTarget::Stage(_) => self.pending_stage = None,
            // No escalation decided before a probe fault survives it
            StageTarget::Hold => {
                if boiler.is_none() && self.pending_stage.is_some_and(|next| next > stage) {
                    self.pending_stage = None;
                }
            }
        }

        let cycle_ms = self.config.stages.profile(stage).cycle_ms();
        if self.timer.expired(now_ms, cycle_ms) {
            self.timer = PhaseTimer::start(now_ms);
            let escalation_blocked = boiler.is_none();
            if let Some(next) = self
                .pending_stage
                .take()
                .filter(|next| *next < stage || !escalation_blocked)
            {
                self.state = CombustionState::Running(next);
                self.emit(Event::StageChanged {
                    from: stage,
                    to: next,
                });
            }
        }
    }

    /// Restart from purge, or lock out once the restart budget is spent
    fn flame_lost(&mut self, now_ms: u32) {
        let restart = self
            .counters
            .record_flame_loss(self.config.startup.run_max_restarts);
        self.emit(Event::FlameLost {
            restart: self.counters.run_restarts,
        });
        if restart {
            self.enter(CombustionState::Startup(StartupPhase::Purge), now_ms);
        } else {
            self.enter_fault(FaultReason::FlameLoss, now_ms);
        }
    }

    fn step_shutdown(&mut self, phase: ShutdownPhase, now_ms: u32) {
        let s = self.config.shutdown;
        match phase {
            ShutdownPhase::Overrun => {
                if self.timer.expired(now_ms, s.pump_overrun_ms) {
                    self.enter(CombustionState::Shutdown(ShutdownPhase::PostPurge), now_ms);
                }
            }
            ShutdownPhase::PostPurge => {
                if self.timer.expired(now_ms, s.post_purge_ms) {
                    self.enter(CombustionState::Idle, now_ms);
                }
            }
        }
    }

    // ---- transitions ---------------------------------------------------

    fn enter(&mut self, next: CombustionState, now_ms: u32) {
        let from = self.state;
        self.state = next;
        self.timer = PhaseTimer::start(now_ms);

        match next {
            CombustionState::Idle => {
                self.flame.stand_down();
                if self.reached_running {
                    self.counters.reset();
                    self.reached_running = false;
                }
            }
            CombustionState::Startup(StartupPhase::Prove) => self.flame.begin_proving(now_ms),
            CombustionState::Running(_) => {
                self.flame.begin_supervising();
                self.reached_running = true;
                self.pending_stage = None;
            }
            CombustionState::Jam { .. } => {}
            CombustionState::Startup(_)
            | CombustionState::Shutdown(_)
            | CombustionState::Fault(_) => self.flame.stand_down(),
        }

        self.emit(Event::StateChanged { from, to: next });
    }

    fn enter_fault(&mut self, reason: FaultReason, now_ms: u32) {
        if matches!(reason, FaultReason::Safety(_))
            && self.state == CombustionState::Shutdown(ShutdownPhase::Overrun)
        {
            self.held_overrun = Some(self.timer);
        }
        self.jam = None;
        self.pending_stage = None;
        self.enter(CombustionState::Fault(reason), now_ms);
        self.emit(Event::FaultLatched(reason));
    }

    // ---- operator commands ---------------------------------------------

    fn reset(&mut self, target: ResetTarget, now_ms: u32) -> bool {
        match target {
            ResetTarget::All => {
                let safety_clear = self.reset_safety();
                let lines_clear = self.stalls.clear_all_faults();
                self.leave_fault(now_ms) && safety_clear && lines_clear
            }
            ResetTarget::Safety => {
                let clear = self.reset_safety();
                if clear && matches!(self.state, CombustionState::Fault(FaultReason::Safety(_))) {
                    self.leave_fault(now_ms)
                } else {
                    clear
                }
            }
            ResetTarget::Burner => self.leave_fault(now_ms),
            ResetTarget::Line(line) => self.stalls.clear_fault(line as usize),
        }
    }

    fn reset_safety(&mut self) -> bool {
        let was_tripped = self.safety.is_tripped();
        let clear = self.safety.reset();
        if was_tripped && clear {
            self.emit(Event::SafetyReset);
        }
        clear
    }

    /// Leave a lockout once nothing holds it
    fn leave_fault(&mut self, now_ms: u32) -> bool {
        if !self.state.is_fault() {
            return true;
        }
        if self.safety.is_tripped() || self.stalls.any_faulted() {
            return false;
        }
        self.counters.reset();
        self.reached_running = false;
        self.jam = None;
        // A held pump overrun runs to its deadline after the reset
        self.emit(Event::FaultCleared);
        self.enter(CombustionState::Idle, now_ms);
        true
    }

    // ---- outputs -------------------------------------------------------

    fn outputs(&self, now_ms: u32) -> ActuatorCommand {
        let elapsed = match self.jam {
            Some(episode) => episode.resume_elapsed_ms,
            None => self.timer.elapsed(now_ms),
        };
        let ctx = OutputContext {
            boiler_degraded: self.sensors.reading(ProbeId::Boiler).is_none(),
            hot_water_call: self.hot_water_call,
            held_overrun: self.held_overrun.is_some(),
        };
        outputs::compute(&self.state, elapsed, &ctx, &self.config)
    }
}
