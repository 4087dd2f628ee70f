//! Millisecond timekeeping
//!
//! The control loop hands every component a monotonic `now_ms` counter.
//! The counter is a `u32` and wraps after ~49 days of uptime, so all
//! comparisons go through wrapping subtraction.

/// Milliseconds elapsed from `since` to `now`, tolerant of counter wrap
#[inline]
pub const fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    now_ms.wrapping_sub(since_ms)
}

/// Start point of a sub-timer
///
/// Each combustion phase owns one of these; the phase is complete once
/// `elapsed(now) >= duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseTimer {
    started_ms: u32,
}

impl PhaseTimer {
    /// Start a timer at `now_ms`
    pub const fn start(now_ms: u32) -> Self {
        Self { started_ms: now_ms }
    }

    /// Start a timer that already has `elapsed_ms` of progress
    ///
    /// Used to resume a phase that was interrupted by jam clearing.
    pub const fn resume(now_ms: u32, elapsed_ms: u32) -> Self {
        Self {
            started_ms: now_ms.wrapping_sub(elapsed_ms),
        }
    }

    /// Time spent in this phase
    pub const fn elapsed(&self, now_ms: u32) -> u32 {
        elapsed_ms(now_ms, self.started_ms)
    }

    /// Check whether `duration_ms` has passed
    pub const fn expired(&self, now_ms: u32, duration_ms: u32) -> bool {
        self.elapsed(now_ms) >= duration_ms
    }

    /// Timestamp the timer was started at
    pub const fn started_ms(&self) -> u32 {
        self.started_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_across_wrap() {
        let since = u32::MAX - 99;
        assert_eq!(elapsed_ms(50, since), 150);
    }

    #[test]
    fn test_phase_timer_expiry() {
        let timer = PhaseTimer::start(1_000);
        assert!(!timer.expired(1_999, 1_000));
        assert!(timer.expired(2_000, 1_000));
    }

    #[test]
    fn test_resume_keeps_progress() {
        let timer = PhaseTimer::resume(10_000, 2_500);
        assert_eq!(timer.elapsed(10_000), 2_500);
        assert_eq!(timer.elapsed(10_500), 3_000);
    }
}
