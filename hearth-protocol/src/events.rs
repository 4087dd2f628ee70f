//! Operator inputs from the panel display buttons

/// Input sent from the panel display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelInput {
    /// Reset button held: clear every latch that can be cleared
    ResetAll,
    /// Reset the safety interlock only
    ResetSafety,
    /// Acknowledge a burner lockout
    ResetBurner,
    /// Clear the fault latch of one feed line
    ResetLine(u8),
    /// Automatic operation
    ModeAuto,
    /// Burner off; safety and pumps stay active
    ModeOff,
}

// Wire format values
const INPUT_RESET_ALL: u8 = 0x01;
const INPUT_RESET_SAFETY: u8 = 0x02;
const INPUT_RESET_BURNER: u8 = 0x03;
const INPUT_MODE_AUTO: u8 = 0x10;
const INPUT_MODE_OFF: u8 = 0x11;
/// Line resets carry the line index in the low nibble
const INPUT_RESET_LINE: u8 = 0x20;

/// Highest line index a reset can address
pub const MAX_LINE_INDEX: u8 = 0x0F;

impl PanelInput {
    /// Parse an input from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            INPUT_RESET_ALL => Some(PanelInput::ResetAll),
            INPUT_RESET_SAFETY => Some(PanelInput::ResetSafety),
            INPUT_RESET_BURNER => Some(PanelInput::ResetBurner),
            INPUT_MODE_AUTO => Some(PanelInput::ModeAuto),
            INPUT_MODE_OFF => Some(PanelInput::ModeOff),
            b if b & 0xF0 == INPUT_RESET_LINE => Some(PanelInput::ResetLine(b & MAX_LINE_INDEX)),
            _ => None,
        }
    }

    /// Convert to wire format byte
    ///
    /// Line indices above [`MAX_LINE_INDEX`] are not representable.
    pub fn to_byte(self) -> Option<u8> {
        match self {
            PanelInput::ResetAll => Some(INPUT_RESET_ALL),
            PanelInput::ResetSafety => Some(INPUT_RESET_SAFETY),
            PanelInput::ResetBurner => Some(INPUT_RESET_BURNER),
            PanelInput::ResetLine(line) if line <= MAX_LINE_INDEX => Some(INPUT_RESET_LINE | line),
            PanelInput::ResetLine(_) => None,
            PanelInput::ModeAuto => Some(INPUT_MODE_AUTO),
            PanelInput::ModeOff => Some(INPUT_MODE_OFF),
        }
    }

    /// Returns true if this input clears a latch
    pub fn is_reset(&self) -> bool {
        matches!(
            self,
            PanelInput::ResetAll
                | PanelInput::ResetSafety
                | PanelInput::ResetBurner
                | PanelInput::ResetLine(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_byte_roundtrip() {
        let inputs = [
            PanelInput::ResetAll,
            PanelInput::ResetSafety,
            PanelInput::ResetBurner,
            PanelInput::ResetLine(0),
            PanelInput::ResetLine(7),
            PanelInput::ModeAuto,
            PanelInput::ModeOff,
        ];

        for input in inputs {
            let byte = input.to_byte().unwrap();
            assert_eq!(PanelInput::from_byte(byte), Some(input));
        }
    }

    #[test]
    fn test_reset_line_encoding() {
        assert_eq!(PanelInput::ResetLine(3).to_byte(), Some(0x23));
        assert_eq!(PanelInput::from_byte(0x2F), Some(PanelInput::ResetLine(15)));
        assert_eq!(PanelInput::ResetLine(16).to_byte(), None);
    }

    #[test]
    fn test_invalid_byte() {
        assert_eq!(PanelInput::from_byte(0x00), None);
        assert_eq!(PanelInput::from_byte(0xFF), None);
        assert_eq!(PanelInput::from_byte(0x12), None);
    }

    #[test]
    fn test_input_classification() {
        assert!(PanelInput::ResetLine(1).is_reset());
        assert!(PanelInput::ResetAll.is_reset());
        assert!(!PanelInput::ModeOff.is_reset());
    }
}
