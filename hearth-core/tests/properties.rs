//! Invariants that must hold for arbitrary input sequences.

use hearth_core::config::{BurnerConfig, PanelConfig, SafetyWiring, StallConfig, TemperatureConfig};
use hearth_core::safety::{ContactLevels, SafetyContact, SafetyInterlock};
use hearth_core::sensor::{normalize, ProbeSample};
use hearth_core::stall::{JamHandler, JamPhase, JamStep};
use hearth_core::{Burner, CombustionState, Inputs};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalized_readings_stay_in_range(raw in any::<i16>(), flagged in any::<bool>()) {
        let config = TemperatureConfig::default();
        let sample = ProbeSample { celsius_x10: raw, fault: flagged };
        match normalize(sample, &config) {
            Ok(reading) => {
                prop_assert!(!flagged);
                prop_assert!(reading.at_least_c(config.valid_min_c));
                prop_assert!(!reading.above_c(config.valid_max_c));
            }
            Err(_) => {
                let in_range = raw as i32 >= config.valid_min_c as i32 * 10
                    && raw as i32 <= config.valid_max_c as i32 * 10;
                prop_assert!(flagged || !in_range);
            }
        }
    }

    #[test]
    fn jam_pulses_bounded_and_episode_ends(step_ms in 10u32..500) {
        let config = StallConfig::default();
        let mut jam = JamHandler::start(0);
        let mut now = 0u32;
        let mut exhausted = false;

        // Three blocks of six 1.2 s pulses plus two cooldowns
        while now < 200_000 {
            now += step_ms;
            prop_assert!(jam.pulses() >= 1);
            prop_assert!(jam.pulses() <= config.jam_max_pulses_per_block);
            prop_assert!(jam.blocks() < config.jam_max_blocks);
            if jam.feeder_on() {
                prop_assert_eq!(jam.phase(), JamPhase::PulseOn);
            }
            if jam.update(now, &config) == JamStep::Exhausted {
                exhausted = true;
                break;
            }
        }
        prop_assert!(exhausted);
    }

    #[test]
    fn first_active_contact_wins(estop in any::<bool>(), high_limit in any::<bool>(), backfire in any::<bool>()) {
        let wiring = SafetyWiring::default();
        let mut levels = ContactLevels::clear_for(&wiring);
        let tripped = [
            (SafetyContact::EStop, estop),
            (SafetyContact::HighLimit, high_limit),
            (SafetyContact::Backfire, backfire),
        ];
        for (contact, on) in tripped {
            if on {
                levels.set(contact, !levels.level(contact));
            }
        }

        let mut interlock = SafetyInterlock::new();
        let expected = tripped.iter().find(|(_, on)| *on).map(|(c, _)| *c);
        prop_assert_eq!(interlock.evaluate(&levels, &wiring), expected);
    }

    #[test]
    fn outputs_respect_state(
        steps in proptest::collection::vec(
            (any::<bool>(), 0u16..1024, 0u8..8, -500i16..1700, any::<bool>()),
            1..400,
        )
    ) {
        let panel = PanelConfig::default();
        let mut burner = Burner::new(BurnerConfig::default(), panel.clone());
        let mut inputs = Inputs::quiescent(&panel);
        let mut now = 0u32;

        for (demand, flame, contact, boiler, stall) in steps {
            inputs.set_demand(&panel, demand);
            inputs.flame_raw = flame;
            inputs.boiler = ProbeSample::ok(boiler);
            inputs.set_stall(&panel, 0, stall);
            // Rare safety trips
            inputs.set_safety(&panel, SafetyContact::Backfire, contact == 7);

            let report = burner.tick(now, &inputs);
            let state = burner.state();

            if report.command.feeder {
                prop_assert!(state.feeding_allowed(), "feeder on in {:?}", state);
            }
            if matches!(state, CombustionState::Fault(_) | CombustionState::Idle) {
                prop_assert!(!report.command.feeder);
                prop_assert_eq!(report.command.fan_power, 0);
            }
            if burner.safety_status() != hearth_core::safety::SafetyStatus::Clear {
                prop_assert!(state.is_fault());
            }
            prop_assert!(report.command.fan_power <= 100);

            now = now.wrapping_add(500);
        }
    }
}
