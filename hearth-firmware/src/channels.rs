//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use hearth_protocol::{PanelInput, StatusReport};

/// Channel capacity for operator inputs from the panel
const INPUT_CHANNEL_SIZE: usize = 8;

/// Operator inputs (resets, mode switch) waiting for the next control tick
pub static PANEL_INPUT: Channel<CriticalSectionRawMutex, PanelInput, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Signal that a heartbeat (PING) was received from the panel
pub static HEARTBEAT_RECEIVED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Latest status report, replaced by every publish
pub static STATUS: Signal<CriticalSectionRawMutex, StatusReport> = Signal::new();
