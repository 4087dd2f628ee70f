//! Panel display link protocol
//!
//! This crate defines the UART protocol between the burner controller and
//! the panel display. The display shows burner status and forwards the
//! operator's buttons; every decision stays on the controller.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌──────┬────────┬──────┬─────────────┬─────────────┐
//! │ SYNC │ LENGTH │ KIND │ PAYLOAD     │ FLETCHER-16 │
//! │ 1B   │ 1B     │ 1B   │ 0–240B      │ 2B          │
//! └──────┴────────┴──────┴─────────────┴─────────────┘
//! ```
//!
//! Status reports are postcard-encoded; operator inputs are single bytes.

#![no_std]
#![deny(unsafe_code)]

pub mod events;
pub mod frame;
pub mod messages;

pub use events::PanelInput;
pub use frame::{Frame, FrameError, FrameParser, FRAME_SYNC, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{
    BurnerPhase, ControllerMessage, DisplayMessage, FaultCode, FlameState, StageCode, StatusReport,
};
