//! Feed line stall detection
//!
//! Each monitored line has a stall contact (motor overload relay, shear
//! pin switch). A line is stalled once its contact has been active
//! continuously for the detect time and clear again once it has been
//! inactive for the same time.

use crate::config::{PanelConfig, MAX_STALL_LINES};
use crate::time::elapsed_ms;

/// Raw stall contact levels, indexed by line
pub type StallLevels = [bool; MAX_STALL_LINES];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct LineState {
    stalled: bool,
    /// Contact has disagreed with `stalled` since this time
    pending_since: Option<u32>,
    /// Still stalled when jam clearing gave up
    faulted: bool,
}

/// Debounced stall state of every feed line
#[derive(Debug, Clone)]
pub struct StallMonitor {
    lines: [LineState; MAX_STALL_LINES],
}

impl StallMonitor {
    pub const fn new() -> Self {
        Self {
            lines: [LineState {
                stalled: false,
                pending_since: None,
                faulted: false,
            }; MAX_STALL_LINES],
        }
    }

    /// Debounce the raw contact levels of the configured lines
    pub fn update(&mut self, now_ms: u32, raw: &StallLevels, panel: &PanelConfig, detect_ms: u32) {
        for (index, line) in self.lines.iter_mut().enumerate() {
            let Some(config) = panel.stall_lines.get(index) else {
                line.stalled = false;
                line.pending_since = None;
                continue;
            };

            let active = config.polarity.is_active(raw[index]);
            if active == line.stalled {
                line.pending_since = None;
                continue;
            }

            let since = *line.pending_since.get_or_insert(now_ms);
            if elapsed_ms(now_ms, since) >= detect_ms {
                line.stalled = active;
                line.pending_since = None;
            }
        }
    }

    pub fn is_stalled(&self, line: usize) -> bool {
        self.lines.get(line).is_some_and(|l| l.stalled)
    }

    pub fn any_stalled(&self) -> bool {
        self.lines.iter().any(|l| l.stalled)
    }

    /// Bit `n` set when line `n` is stalled
    pub fn stalled_mask(&self) -> u8 {
        mask(self.lines.iter().map(|l| l.stalled))
    }

    /// Latch every currently stalled line as faulted
    pub fn latch_faults(&mut self) {
        for line in self.lines.iter_mut() {
            line.faulted |= line.stalled;
        }
    }

    pub fn is_faulted(&self, line: usize) -> bool {
        self.lines.get(line).is_some_and(|l| l.faulted)
    }

    pub fn any_faulted(&self) -> bool {
        self.lines.iter().any(|l| l.faulted)
    }

    /// Bit `n` set when line `n` is latched faulted
    pub fn fault_mask(&self) -> u8 {
        mask(self.lines.iter().map(|l| l.faulted))
    }

    /// Release a line's fault latch if the line is no longer stalled
    ///
    /// Returns whether the line is free of faults afterwards.
    pub fn clear_fault(&mut self, line: usize) -> bool {
        match self.lines.get_mut(line) {
            Some(l) if !l.stalled => {
                l.faulted = false;
                true
            }
            Some(l) => !l.faulted,
            None => true,
        }
    }

    /// Release every line that is no longer stalled
    pub fn clear_all_faults(&mut self) -> bool {
        (0..MAX_STALL_LINES).fold(true, |clear, line| self.clear_fault(line) && clear)
    }
}

impl Default for StallMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn mask(bits: impl Iterator<Item = bool>) -> u8 {
    bits.enumerate()
        .fold(0, |acc, (i, set)| if set { acc | (1 << i) } else { acc })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Polarity;

    const DETECT: u32 = 300;

    fn panel() -> PanelConfig {
        // "auger" is active-low
        PanelConfig::default()
    }

    fn levels(auger_active: bool) -> StallLevels {
        let mut raw = [true; MAX_STALL_LINES];
        raw[0] = !auger_active;
        raw
    }

    #[test]
    fn test_stall_needs_detect_time() {
        let mut m = StallMonitor::new();
        m.update(0, &levels(true), &panel(), DETECT);
        m.update(200, &levels(true), &panel(), DETECT);
        assert!(!m.any_stalled());
        m.update(300, &levels(true), &panel(), DETECT);
        assert!(m.is_stalled(0));
        assert_eq!(m.stalled_mask(), 0b1);
    }

    #[test]
    fn test_glitch_ignored() {
        let mut m = StallMonitor::new();
        m.update(0, &levels(true), &panel(), DETECT);
        m.update(200, &levels(false), &panel(), DETECT);
        m.update(400, &levels(true), &panel(), DETECT);
        assert!(!m.any_stalled());
    }

    #[test]
    fn test_clear_needs_detect_time() {
        let mut m = StallMonitor::new();
        m.update(0, &levels(true), &panel(), DETECT);
        m.update(300, &levels(true), &panel(), DETECT);
        m.update(400, &levels(false), &panel(), DETECT);
        assert!(m.any_stalled());
        m.update(700, &levels(false), &panel(), DETECT);
        assert!(!m.any_stalled());
    }

    #[test]
    fn test_unconfigured_lines_ignored() {
        let mut m = StallMonitor::new();
        let mut raw = levels(false);
        raw[5] = false;
        m.update(0, &raw, &panel(), DETECT);
        m.update(1_000, &raw, &panel(), DETECT);
        assert!(!m.any_stalled());
    }

    #[test]
    fn test_fault_latch() {
        let mut panel = panel();
        panel.stall_lines[0].polarity = Polarity::ActiveHigh;
        let mut m = StallMonitor::new();
        let mut raw = [false; MAX_STALL_LINES];
        raw[0] = true;
        m.update(0, &raw, &panel, DETECT);
        m.update(300, &raw, &panel, DETECT);
        m.latch_faults();
        assert!(m.is_faulted(0));
        assert_eq!(m.fault_mask(), 0b1);

        // Still stalled: latch holds
        assert!(!m.clear_fault(0));

        raw[0] = false;
        m.update(400, &raw, &panel, DETECT);
        m.update(700, &raw, &panel, DETECT);
        assert!(m.clear_all_faults());
        assert!(!m.any_faulted());
    }
}
