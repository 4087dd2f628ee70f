//! Flame supervision
//!
//! Raw flame sensor samples are pushed every tick into a rolling window.
//! The window average is compared against the threshold once per
//! evaluation interval to give the instantaneous presence value; two
//! debounce timers then turn presence into proving and loss events.
//!
//! Presence/absence tracking runs continuously, regardless of mode, so
//! flame that catches during the feed phase already counts toward proof.

use heapless::Deque;

use crate::config::{FlameConfig, MAX_FLAME_SAMPLES};
use crate::time::elapsed_ms;

/// Debounced flame status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlameStatus {
    #[default]
    Unproven,
    Proven,
    Lost,
}

/// Edge reported by the monitor, each at most once per window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlameEvent {
    /// Flame held for the stable time while proving
    Proven,
    /// Proving window ran out
    ProveTimeout,
    /// Flame absent for the loss confirm time while supervising
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Standby,
    Proving { started_ms: u32, timed_out: bool },
    Supervising,
}

/// Flame monitor
#[derive(Debug, Clone)]
pub struct FlameMonitor {
    window: Deque<u16, MAX_FLAME_SAMPLES>,
    last_eval_ms: Option<u32>,
    /// Instantaneous presence and the time it last changed
    presence: Option<(bool, u32)>,
    status: FlameStatus,
    mode: Mode,
}

impl FlameMonitor {
    pub const fn new() -> Self {
        Self {
            window: Deque::new(),
            last_eval_ms: None,
            presence: None,
            status: FlameStatus::Unproven,
            mode: Mode::Standby,
        }
    }

    /// Start proving; the timeout runs from `started_ms`
    ///
    /// Passing an earlier start resumes a proving window that was
    /// interrupted.
    pub fn begin_proving(&mut self, started_ms: u32) {
        self.status = FlameStatus::Unproven;
        self.mode = Mode::Proving {
            started_ms,
            timed_out: false,
        };
    }

    /// Watch for flame loss
    ///
    /// A loss seen while supervision was suspended is reported again if
    /// the flame is still absent.
    pub fn begin_supervising(&mut self) {
        self.mode = Mode::Supervising;
        if self.status == FlameStatus::Lost {
            self.status = FlameStatus::Proven;
        }
    }

    /// Stop reporting events
    ///
    /// A lost flame stays visible in the status until proving restarts.
    pub fn stand_down(&mut self) {
        self.mode = Mode::Standby;
        if self.status == FlameStatus::Proven {
            self.status = FlameStatus::Unproven;
        }
    }

    /// Debounced status
    pub fn status(&self) -> FlameStatus {
        self.status
    }

    /// Instantaneous presence from the last evaluation
    pub fn present(&self) -> bool {
        matches!(self.presence, Some((true, _)))
    }

    /// Current window average, `None` before the first sample
    pub fn average(&self) -> Option<u16> {
        let len = self.window.len() as u32;
        if len == 0 {
            return None;
        }
        let sum: u32 = self.window.iter().map(|&s| s as u32).sum();
        Some((sum / len) as u16)
    }

    /// Push one sample and evaluate the debounce timers
    pub fn update(&mut self, now_ms: u32, raw: u16, config: &FlameConfig) -> Option<FlameEvent> {
        let capacity = (config.samples as usize).clamp(1, MAX_FLAME_SAMPLES);
        while self.window.len() >= capacity {
            self.window.pop_front();
        }
        // Cannot fail: length is below capacity after trimming
        let _ = self.window.push_back(raw);

        let due = match self.last_eval_ms {
            None => true,
            Some(last) => elapsed_ms(now_ms, last) >= config.interval_ms,
        };
        if due {
            self.last_eval_ms = Some(now_ms);
            self.evaluate(now_ms, config.threshold);
        }

        self.debounce(now_ms, config)
    }

    fn evaluate(&mut self, now_ms: u32, threshold: u16) {
        let present = self.average().is_some_and(|avg| avg >= threshold);
        match self.presence {
            Some((was, _)) if was == present => {}
            _ => self.presence = Some((present, now_ms)),
        }
    }

    fn debounce(&mut self, now_ms: u32, config: &FlameConfig) -> Option<FlameEvent> {
        let (present, since_ms) = self.presence?;
        let held = elapsed_ms(now_ms, since_ms);

        match &mut self.mode {
            Mode::Standby => None,
            Mode::Proving {
                started_ms,
                timed_out,
            } => {
                if self.status == FlameStatus::Proven {
                    return None;
                }
                if present && held >= config.startup_stable_ms {
                    self.status = FlameStatus::Proven;
                    return Some(FlameEvent::Proven);
                }
                if !*timed_out && elapsed_ms(now_ms, *started_ms) >= config.startup_prove_timeout_ms
                {
                    *timed_out = true;
                    return Some(FlameEvent::ProveTimeout);
                }
                None
            }
            Mode::Supervising => {
                if !present && held >= config.run_loss_confirm_ms && self.status != FlameStatus::Lost
                {
                    self.status = FlameStatus::Lost;
                    return Some(FlameEvent::Lost);
                }
                if present && self.status == FlameStatus::Unproven {
                    self.status = FlameStatus::Proven;
                }
                None
            }
        }
    }
}

impl Default for FlameMonitor {
    fn default() -> Self {
        Self::new()
    }
}
