//! Safety interlock
//!
//! Highest-priority gate over the safety chain contacts.

pub mod interlock;

pub use interlock::{ContactLevels, SafetyContact, SafetyInterlock, SafetyStatus};
