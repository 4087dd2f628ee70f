//! Message types for the panel link
//!
//! Message kinds are divided into two categories:
//! - Display → Controller: operator inputs, heartbeat requests
//! - Controller → Display: status reports, heartbeat responses
//!
//! Status reports are postcard-encoded so the display can be written
//! against the same types.

use serde::{Deserialize, Serialize};

use crate::events::PanelInput;
use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

// Message kinds: Display → Controller
pub const MSG_INPUT: u8 = 0x01;
pub const MSG_PING: u8 = 0x02;

// Message kinds: Controller → Display
pub const MSG_STATUS: u8 = 0x20;
pub const MSG_PONG: u8 = 0x21;

/// Burner phase as shown on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurnerPhase {
    Idle,
    Purge,
    Feed,
    Prove,
    RetryDelay,
    Running,
    Jam,
    Overrun,
    PostPurge,
    Fault,
}

/// Firing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageCode {
    Low,
    Med,
    High,
}

/// Lockout or trip cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCode {
    EStop,
    HighLimit,
    Backfire,
    IgnitionFailed,
    FlameLoss,
    JamUnresolved,
}

/// Debounced flame status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlameState {
    Unproven,
    Proven,
    Lost,
}

/// Periodic controller status
///
/// Temperatures are tenths of a degree Celsius; `None` marks a faulted
/// probe. Line masks have bit `n` set for feed line `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub uptime_ms: u32,
    pub phase: BurnerPhase,
    /// Stage fired, or resumed after a jam
    pub stage: Option<StageCode>,
    /// Latched lockout cause
    pub fault: Option<FaultCode>,
    /// Latched safety trip, reported separately since it outlives the lockout
    pub safety_trip: Option<FaultCode>,
    pub flame: FlameState,
    pub flame_average: u16,
    pub boiler_x10: Option<i16>,
    pub hot_water_x10: Option<i16>,
    pub chimney_x10: Option<i16>,
    pub chimney_warning: bool,
    pub auto_mode: bool,
    pub feeder: bool,
    pub fan_power: u8,
    pub hot_water_pump: bool,
    pub central_heating_pump: bool,
    pub stalled_lines: u8,
    pub faulted_lines: u8,
    pub startup_retries: u8,
    pub run_restarts: u8,
    pub jam_pulses: u8,
    pub jam_blocks: u8,
}

/// Messages from the controller to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerMessage {
    /// Status snapshot
    Status(StatusReport),
    /// Heartbeat response
    Pong,
}

impl ControllerMessage {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            ControllerMessage::Status(report) => {
                let mut payload = [0u8; MAX_PAYLOAD_SIZE];
                let used = postcard::to_slice(report, &mut payload)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(MSG_STATUS, used)
            }
            ControllerMessage::Pong => Ok(Frame::empty(MSG_PONG)),
        }
    }

    /// Parse a message from a frame (display side)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.kind {
            MSG_STATUS => postcard::from_bytes(&frame.payload)
                .map(ControllerMessage::Status)
                .map_err(|_| FrameError::Decode),
            MSG_PONG => Ok(ControllerMessage::Pong),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

/// Messages parsed from display-originated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMessage {
    /// Operator input
    Input(PanelInput),
    /// Heartbeat request
    Ping,
}

impl DisplayMessage {
    /// Parse a message from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.kind {
            MSG_INPUT => {
                let byte = *frame.payload.first().ok_or(FrameError::InvalidFrame)?;
                let input = PanelInput::from_byte(byte).ok_or(FrameError::InvalidFrame)?;
                Ok(DisplayMessage::Input(input))
            }
            MSG_PING => Ok(DisplayMessage::Ping),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this message into a frame (for testing or simulation)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            DisplayMessage::Input(input) => {
                let byte = input.to_byte().ok_or(FrameError::InvalidFrame)?;
                Frame::new(MSG_INPUT, &[byte])
            }
            DisplayMessage::Ping => Ok(Frame::empty(MSG_PING)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParser;

    fn report() -> StatusReport {
        StatusReport {
            uptime_ms: 123_456,
            phase: BurnerPhase::Running,
            stage: Some(StageCode::Med),
            fault: None,
            safety_trip: None,
            flame: FlameState::Proven,
            flame_average: 812,
            boiler_x10: Some(662),
            hot_water_x10: Some(548),
            chimney_x10: None,
            chimney_warning: false,
            auto_mode: true,
            feeder: true,
            fan_power: 60,
            hot_water_pump: true,
            central_heating_pump: true,
            stalled_lines: 0,
            faulted_lines: 0b10,
            startup_retries: 1,
            run_restarts: 0,
            jam_pulses: 0,
            jam_blocks: 0,
        }
    }

    #[test]
    fn test_status_through_frame() {
        let msg = ControllerMessage::Status(report());
        let encoded = msg.to_frame().unwrap().encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let frame = parser.feed_bytes(&encoded).unwrap().unwrap();
        assert_eq!(frame.kind, MSG_STATUS);
        assert_eq!(ControllerMessage::from_frame(&frame), Ok(msg));
    }

    #[test]
    fn test_status_fits_payload() {
        let frame = ControllerMessage::Status(report()).to_frame().unwrap();
        assert!(frame.payload.len() < 64);
    }

    #[test]
    fn test_truncated_status_rejected() {
        let mut frame = ControllerMessage::Status(report()).to_frame().unwrap();
        frame.payload.truncate(4);
        assert_eq!(
            ControllerMessage::from_frame(&frame),
            Err(FrameError::Decode)
        );
    }

    #[test]
    fn test_pong() {
        let frame = ControllerMessage::Pong.to_frame().unwrap();
        assert_eq!(frame.kind, MSG_PONG);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_display_input_parse() {
        let frame = Frame::new(MSG_INPUT, &[0x21]).unwrap();
        assert_eq!(
            DisplayMessage::from_frame(&frame),
            Ok(DisplayMessage::Input(PanelInput::ResetLine(1)))
        );
    }

    #[test]
    fn test_display_ping_parse() {
        let frame = Frame::empty(MSG_PING);
        assert_eq!(DisplayMessage::from_frame(&frame), Ok(DisplayMessage::Ping));
    }

    #[test]
    fn test_display_input_roundtrip() {
        let msg = DisplayMessage::Input(PanelInput::ModeOff);
        let frame = msg.to_frame().unwrap();
        assert_eq!(DisplayMessage::from_frame(&frame), Ok(msg));
    }

    #[test]
    fn test_invalid_kind() {
        let frame = Frame::empty(0xFF);
        assert_eq!(
            DisplayMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_empty_input_payload() {
        let frame = Frame::empty(MSG_INPUT);
        assert_eq!(
            DisplayMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }
}
