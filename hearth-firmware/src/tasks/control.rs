//! Burner control task
//!
//! Runs the burner once per tick:
//! - Applies queued panel inputs
//! - Samples the analog inputs and reads contacts
//! - Drives the relays and fan from the resulting command
//! - Publishes status for the panel link

use defmt::*;
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Instant, Ticker};

use hearth_core::state::Command;
use hearth_core::{Burner, Event};

use crate::board::{AnalogInputs, BoardActuators, BoardInputs, ContactInputs};
use crate::channels::{PANEL_INPUT, STATUS};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u32 = 100;

/// Ticks between unsolicited status reports
const STATUS_EVERY_TICKS: u32 = 10;

/// Watchdog timeout; several missed ticks reset the board with outputs off
pub const WATCHDOG_TIMEOUT_MS: u64 = 1_000;

/// Control task - owns the burner and every burner I/O
#[embassy_executor::task]
pub async fn control_task(
    mut burner: Burner,
    mut analog: AnalogInputs,
    mut contacts: ContactInputs,
    mut actuators: BoardActuators,
    mut watchdog: Watchdog,
) {
    info!("Control task started");

    actuators.all_off();
    watchdog.start(Duration::from_millis(WATCHDOG_TIMEOUT_MS));

    let start = Instant::now();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS as u64));
    let mut ticks: u32 = 0;

    loop {
        ticker.next().await;
        watchdog.feed();

        // Wraps after ~49 days; burner timers use wrapping arithmetic
        let now_ms = start.elapsed().as_millis() as u32;

        while let Ok(input) = PANEL_INPUT.try_receive() {
            if burner.command_input(Command::from(input), now_ms) {
                info!("Panel input applied: {:?}", input);
            } else {
                warn!("Panel input refused, condition still present: {:?}", input);
            }
        }

        let snapshot = analog.sample().await;
        let mut source = BoardInputs::new(&snapshot, &mut contacts);
        let report = burner.run_tick(now_ms, &mut source, &mut actuators);

        for event in report.events.iter() {
            log_event(event);
        }

        ticks = ticks.wrapping_add(1);
        if !report.events.is_empty() || ticks % STATUS_EVERY_TICKS == 0 {
            STATUS.signal(burner.telemetry().to_report());
        }
    }
}

fn log_event(event: &Event) {
    if event.is_alarm() {
        warn!("{:?}", event);
    } else {
        info!("{:?}", event);
    }
}
