//! Retry budgets for one heat cycle

/// Failed ignitions and flame losses since the last completed cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryCounters {
    pub startup_retries: u8,
    pub run_restarts: u8,
}

impl RetryCounters {
    pub const fn new() -> Self {
        Self {
            startup_retries: 0,
            run_restarts: 0,
        }
    }

    /// Count a failed ignition; `true` while another attempt is allowed
    pub fn record_prove_timeout(&mut self, max_retries: u8) -> bool {
        self.startup_retries = self.startup_retries.saturating_add(1);
        self.startup_retries < max_retries
    }

    /// Count a flame loss; `true` while a restart is allowed
    pub fn record_flame_loss(&mut self, max_restarts: u8) -> bool {
        self.run_restarts = self.run_restarts.saturating_add(1);
        self.run_restarts < max_restarts
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_budget() {
        let mut c = RetryCounters::new();
        assert!(c.record_prove_timeout(2));
        assert!(!c.record_prove_timeout(2));
        assert_eq!(c.startup_retries, 2);
    }

    #[test]
    fn test_restart_budget_and_reset() {
        let mut c = RetryCounters::new();
        assert!(c.record_flame_loss(2));
        assert_eq!(c.run_restarts, 1);
        c.reset();
        assert_eq!(c, RetryCounters::default());
    }

    #[test]
    fn test_zero_budget_faults_first_time() {
        let mut c = RetryCounters::new();
        assert!(!c.record_prove_timeout(0));
    }
}
