//! Safety interlock
//!
//! Reads the emergency stop, boiler high-limit and backfire contacts on
//! every tick before any other decision. A trip latches; it is released
//! only by an explicit reset while every contact reads clear.

use crate::config::{Polarity, SafetyWiring};

/// Safety chain contacts, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyContact {
    /// Operator emergency stop
    EStop,
    /// Boiler overheat thermostat
    HighLimit,
    /// Burn-back into the fuel feed
    Backfire,
}

impl SafetyContact {
    pub const ALL: [SafetyContact; 3] = [
        SafetyContact::EStop,
        SafetyContact::HighLimit,
        SafetyContact::Backfire,
    ];
}

/// Raw pin levels of the safety contacts (`true` = electrically high)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContactLevels {
    pub estop: bool,
    pub high_limit: bool,
    pub backfire: bool,
}

impl ContactLevels {
    /// Levels that read as clear for the given wiring
    pub const fn clear_for(wiring: &SafetyWiring) -> Self {
        Self {
            estop: wiring.estop.level_for(false),
            high_limit: wiring.high_limit.level_for(false),
            backfire: wiring.backfire.level_for(false),
        }
    }

    /// Raw level of a single contact
    pub const fn level(&self, contact: SafetyContact) -> bool {
        match contact {
            SafetyContact::EStop => self.estop,
            SafetyContact::HighLimit => self.high_limit,
            SafetyContact::Backfire => self.backfire,
        }
    }

    /// Set the raw level of a single contact
    pub fn set(&mut self, contact: SafetyContact, level: bool) {
        match contact {
            SafetyContact::EStop => self.estop = level,
            SafetyContact::HighLimit => self.high_limit = level,
            SafetyContact::Backfire => self.backfire = level,
        }
    }
}

/// Interlock status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    #[default]
    Clear,
    /// Latched on the first contact that tripped
    Tripped(SafetyContact),
}

/// Latching safety interlock
#[derive(Debug, Clone, Default)]
pub struct SafetyInterlock {
    latched: Option<SafetyContact>,
    /// Contacts active on the last evaluation
    active: Option<SafetyContact>,
}

impl SafetyInterlock {
    pub const fn new() -> Self {
        Self {
            latched: None,
            active: None,
        }
    }

    /// Evaluate the contacts
    ///
    /// Returns the contact that caused a new trip. A trip that is
    /// already latched is not reported again.
    pub fn evaluate(&mut self, levels: &ContactLevels, wiring: &SafetyWiring) -> Option<SafetyContact> {
        self.active = SafetyContact::ALL
            .into_iter()
            .find(|&c| polarity(wiring, c).is_active(levels.level(c)));

        match (self.latched, self.active) {
            (None, Some(contact)) => {
                self.latched = Some(contact);
                Some(contact)
            }
            _ => None,
        }
    }

    /// Latched status
    pub fn status(&self) -> SafetyStatus {
        match self.latched {
            Some(contact) => SafetyStatus::Tripped(contact),
            None => SafetyStatus::Clear,
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.latched.is_some()
    }

    /// Every contact read clear on the last evaluation
    pub fn contacts_clear(&self) -> bool {
        self.active.is_none()
    }

    /// Highest-precedence contact currently active
    pub fn active_contact(&self) -> Option<SafetyContact> {
        self.active
    }

    /// Release the latch if every contact is clear
    ///
    /// Returns whether the interlock is clear afterwards.
    pub fn reset(&mut self) -> bool {
        if self.contacts_clear() {
            self.latched = None;
        }
        !self.is_tripped()
    }
}

/// Configured polarity of a contact
pub fn polarity(wiring: &SafetyWiring, contact: SafetyContact) -> Polarity {
    match contact {
        SafetyContact::EStop => wiring.estop,
        SafetyContact::HighLimit => wiring.high_limit,
        SafetyContact::Backfire => wiring.backfire,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiring() -> SafetyWiring {
        SafetyWiring::default()
    }

    #[test]
    fn test_clear_levels_do_not_trip() {
        let mut s = SafetyInterlock::new();
        let levels = ContactLevels::clear_for(&wiring());
        assert_eq!(levels, ContactLevels { estop: true, high_limit: true, backfire: true });
        assert_eq!(s.evaluate(&levels, &wiring()), None);
        assert_eq!(s.status(), SafetyStatus::Clear);
    }

    #[test]
    fn test_trip_latches_and_reports_once() {
        let mut s = SafetyInterlock::new();
        let mut levels = ContactLevels::clear_for(&wiring());
        levels.high_limit = false;

        assert_eq!(s.evaluate(&levels, &wiring()), Some(SafetyContact::HighLimit));
        assert_eq!(s.evaluate(&levels, &wiring()), None);
        assert_eq!(s.status(), SafetyStatus::Tripped(SafetyContact::HighLimit));

        // Contact clears, latch stays
        let levels = ContactLevels::clear_for(&wiring());
        s.evaluate(&levels, &wiring());
        assert!(s.is_tripped());
        assert!(s.contacts_clear());
    }

    #[test]
    fn test_reset_requires_clear_contacts() {
        let mut s = SafetyInterlock::new();
        let mut levels = ContactLevels::clear_for(&wiring());
        levels.estop = false;
        s.evaluate(&levels, &wiring());

        assert!(!s.reset());
        assert!(s.is_tripped());

        levels.estop = true;
        s.evaluate(&levels, &wiring());
        assert!(s.reset());
        assert_eq!(s.status(), SafetyStatus::Clear);
    }

    #[test]
    fn test_precedence() {
        let mut s = SafetyInterlock::new();
        let levels = ContactLevels { estop: false, high_limit: false, backfire: false };
        assert_eq!(s.evaluate(&levels, &wiring()), Some(SafetyContact::EStop));
    }

    #[test]
    fn test_active_high_wiring() {
        let wiring = SafetyWiring {
            backfire: Polarity::ActiveHigh,
            ..SafetyWiring::default()
        };
        let mut s = SafetyInterlock::new();
        let mut levels = ContactLevels::clear_for(&wiring);
        assert!(!levels.backfire);
        assert_eq!(s.evaluate(&levels, &wiring), None);
        levels.set(SafetyContact::Backfire, true);
        assert_eq!(s.evaluate(&levels, &wiring), Some(SafetyContact::Backfire));
    }
}
