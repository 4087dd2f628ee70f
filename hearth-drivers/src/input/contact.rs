//! Dry-contact input
//!
//! Reads the raw electrical level of a switch or relay contact. The
//! burner applies polarity itself; this driver only decides what level to
//! report when the pin cannot be read.

use embedded_hal::digital::InputPin;
use hearth_core::config::Polarity;

/// Contact on a GPIO input
pub struct Contact<P> {
    pin: P,
    /// Level reported when a read fails
    fail_level: bool,
}

impl<P: InputPin> Contact<P> {
    /// Contact that reads as asserted when the pin cannot be read
    ///
    /// Use for safety chain and stall contacts, where an unreadable input
    /// must stop the burner.
    pub fn fail_asserted(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            fail_level: polarity.level_for(true),
        }
    }

    /// Contact that reads as released when the pin cannot be read
    ///
    /// Use for the heat demand input, where an unreadable input must not
    /// start the burner.
    pub fn fail_released(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            fail_level: polarity.level_for(false),
        }
    }

    /// Raw level (`true` = high)
    pub fn level(&mut self) -> bool {
        self.pin.is_high().unwrap_or(self.fail_level)
    }
}
