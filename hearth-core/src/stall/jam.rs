//! Jam clearing
//!
//! While a feed line is stalled the feeder is pulsed to free the fuel:
//! a block of short on/off pulses, then a cooldown, then another block.
//! The number of blocks per jam episode is bounded; running out of blocks
//! means the jam cannot be cleared automatically.

use crate::config::StallConfig;
use crate::time::PhaseTimer;

/// Jam clearing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JamPhase {
    /// Feeder driven
    PulseOn,
    /// Feeder rests between pulses
    PulseOff,
    /// Feeder rests after a full block
    Cooldown,
}

/// Outcome of a jam clearing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JamStep {
    Continue,
    /// Last block finished without the stall clearing
    Exhausted,
}

/// Pulse sequencer for one jam episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JamHandler {
    phase: JamPhase,
    timer: PhaseTimer,
    /// Pulses started in the current block
    pulses: u8,
    /// Blocks completed in this episode
    blocks: u8,
}

impl JamHandler {
    /// Begin an episode with the first pulse
    pub const fn start(now_ms: u32) -> Self {
        Self {
            phase: JamPhase::PulseOn,
            timer: PhaseTimer::start(now_ms),
            pulses: 1,
            blocks: 0,
        }
    }

    /// Advance the pulse sequence
    pub fn update(&mut self, now_ms: u32, config: &StallConfig) -> JamStep {
        match self.phase {
            JamPhase::PulseOn => {
                if self.timer.expired(now_ms, config.jam_pulse_on_ms) {
                    self.enter(JamPhase::PulseOff, now_ms);
                }
            }
            JamPhase::PulseOff => {
                if self.timer.expired(now_ms, config.jam_pulse_off_ms) {
                    if self.pulses < config.jam_max_pulses_per_block {
                        self.pulses += 1;
                        self.enter(JamPhase::PulseOn, now_ms);
                    } else {
                        self.blocks = self.blocks.saturating_add(1);
                        if self.blocks >= config.jam_max_blocks {
                            return JamStep::Exhausted;
                        }
                        self.enter(JamPhase::Cooldown, now_ms);
                    }
                }
            }
            JamPhase::Cooldown => {
                if self.timer.expired(now_ms, config.jam_cooldown_ms) {
                    // Counter restarts and the next block begins at once
                    self.pulses = 1;
                    self.enter(JamPhase::PulseOn, now_ms);
                }
            }
        }
        JamStep::Continue
    }

    fn enter(&mut self, phase: JamPhase, now_ms: u32) {
        self.phase = phase;
        self.timer = PhaseTimer::start(now_ms);
    }

    pub fn phase(&self) -> JamPhase {
        self.phase
    }

    /// Feeder output for the current phase
    pub fn feeder_on(&self) -> bool {
        self.phase == JamPhase::PulseOn
    }

    pub fn pulses(&self) -> u8 {
        self.pulses
    }

    pub fn blocks(&self) -> u8 {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Step in 100 ms ticks until `until`, returning the outcome
    fn run(jam: &mut JamHandler, from: u32, until: u32, cfg: &StallConfig) -> (u32, JamStep) {
        let mut t = from;
        while t < until {
            if jam.update(t, cfg) == JamStep::Exhausted {
                return (t, JamStep::Exhausted);
            }
            assert!(jam.pulses() <= cfg.jam_max_pulses_per_block);
            t += 100;
        }
        (t, JamStep::Continue)
    }

    #[test]
    fn test_pulse_sequence() {
        let cfg = StallConfig::default();
        let mut jam = JamHandler::start(0);
        assert!(jam.feeder_on());
        assert_eq!(jam.pulses(), 1);

        jam.update(500, &cfg);
        assert_eq!(jam.phase(), JamPhase::PulseOff);
        jam.update(1_199, &cfg);
        assert_eq!(jam.phase(), JamPhase::PulseOff);
        jam.update(1_200, &cfg);
        assert_eq!(jam.phase(), JamPhase::PulseOn);
        assert_eq!(jam.pulses(), 2);
    }

    #[test]
    fn test_block_then_cooldown() {
        let cfg = StallConfig::default();
        let mut jam = JamHandler::start(0);
        // Six pulses of 1.2 s
        run(&mut jam, 0, 7_200, &cfg);
        jam.update(7_200, &cfg);
        assert_eq!(jam.phase(), JamPhase::Cooldown);
        assert_eq!(jam.pulses(), 6);
        assert_eq!(jam.blocks(), 1);
        assert!(!jam.feeder_on());

        jam.update(17_200, &cfg);
        assert_eq!(jam.phase(), JamPhase::PulseOn);
        assert_eq!(jam.pulses(), 1);
    }

    #[test]
    fn test_exhausted_after_max_blocks() {
        let cfg = StallConfig::default();
        let mut jam = JamHandler::start(0);
        let (t, step) = run(&mut jam, 0, 100_000, &cfg);
        assert_eq!(step, JamStep::Exhausted);
        // 3 blocks of 7.2 s with two 10 s cooldowns between them
        assert_eq!(t, 3 * 7_200 + 2 * 10_000);
        assert_eq!(jam.blocks(), 3);
    }

    #[test]
    fn test_single_block_budget() {
        let cfg = StallConfig {
            jam_max_blocks: 1,
            jam_max_pulses_per_block: 2,
            ..StallConfig::default()
        };
        let mut jam = JamHandler::start(0);
        let (t, step) = run(&mut jam, 0, 100_000, &cfg);
        assert_eq!(step, JamStep::Exhausted);
        assert_eq!(t, 2_400);
    }
}
