//! Scroll-vs-tap disambiguation for the bottom-sheet list

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollGuardConfig {
    /// Vertical travel that turns a touch into a scroll
    pub scroll_threshold_px: f64,
    /// Taps stay disabled this long after the last scroll motion
    pub quiet_period_ms: u64,
}

impl Default for ScrollGuardConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 8.0,
            quiet_period_ms: 1000,
        }
    }
}

/// Tracks one touch gesture at a time. All time is passed in by the caller.
#[derive(Debug, Clone)]
pub struct ScrollGuard {
    config: ScrollGuardConfig,
    start_y: Option<f64>,
    scrolling: bool,
    last_motion: Option<Instant>,
}

impl Default for ScrollGuard {
    fn default() -> Self {
        Self::new(ScrollGuardConfig::default())
    }
}

impl ScrollGuard {
    pub fn new(config: ScrollGuardConfig) -> Self {
        Self {
            config,
            start_y: None,
            scrolling: false,
            last_motion: None,
        }
    }

    pub fn config(&self) -> &ScrollGuardConfig {
        &self.config
    }

    fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.config.quiet_period_ms)
    }

    pub fn touch_start(&mut self, y: f64, now: Instant) {
        self.settle(now);
        self.start_y = Some(y);
    }

    /// Returns true when this move turned the gesture into a scroll
    pub fn touch_move(&mut self, y: f64, now: Instant) -> bool {
        let Some(start) = self.start_y else {
            return false;
        };

        if self.scrolling {
            self.last_motion = Some(now);
            return false;
        }

        if (y - start).abs() > self.config.scroll_threshold_px {
            self.scrolling = true;
            self.last_motion = Some(now);
            return true;
        }

        false
    }

    pub fn touch_end(&mut self) {
        self.start_y = None;
    }

    pub fn is_scrolling(&self, now: Instant) -> bool {
        match (self.scrolling, self.last_motion) {
            (true, Some(last)) => now.saturating_duration_since(last) < self.quiet_period(),
            _ => false,
        }
    }

    /// When taps become possible again, if currently blocked
    pub fn quiet_deadline(&self) -> Option<Instant> {
        if !self.scrolling {
            return None;
        }
        self.last_motion.map(|last| last + self.quiet_period())
    }

    /// Whether a tap on a sheet item should select it
    pub fn tap(&mut self, index: usize, now: Instant) -> bool {
        self.settle(now);
        if self.scrolling {
            tracing::debug!(index, "Sheet tap ignored while scrolling");
            return false;
        }
        true
    }

    /// Clear an expired scroll; true when taps just became possible again
    pub fn settle(&mut self, now: Instant) -> bool {
        if self.scrolling && !self.is_scrolling(now) {
            self.scrolling = false;
            self.last_motion = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_plain_tap_accepted() {
        let t0 = Instant::now();
        let mut guard = ScrollGuard::default();

        guard.touch_start(100.0, t0);
        assert!(!guard.touch_move(104.0, t0 + ms(10)));
        guard.touch_end();

        assert!(guard.tap(3, t0 + ms(20)));
    }

    #[test]
    fn test_scroll_blocks_taps_until_quiet() {
        let t0 = Instant::now();
        let mut guard = ScrollGuard::default();

        guard.touch_start(100.0, t0);
        assert!(guard.touch_move(130.0, t0 + ms(20)));
        guard.touch_end();

        assert!(guard.is_scrolling(t0 + ms(500)));
        assert!(!guard.tap(1, t0 + ms(500)));
        assert_eq!(guard.quiet_deadline(), Some(t0 + ms(1020)));

        assert!(!guard.is_scrolling(t0 + ms(1020)));
        assert!(guard.tap(1, t0 + ms(1020)));
        assert_eq!(guard.quiet_deadline(), None);
    }

    #[test]
    fn test_continued_motion_extends_quiet_period() {
        let t0 = Instant::now();
        let mut guard = ScrollGuard::default();

        guard.touch_start(0.0, t0);
        guard.touch_move(50.0, t0);
        guard.touch_move(200.0, t0 + ms(900));

        assert!(!guard.tap(0, t0 + ms(1500)));
        assert!(guard.tap(0, t0 + ms(1900)));
    }

    #[test]
    fn test_settle_reports_transition_once() {
        let t0 = Instant::now();
        let mut guard = ScrollGuard::default();
        guard.touch_start(0.0, t0);
        guard.touch_move(40.0, t0);

        assert!(!guard.settle(t0 + ms(999)));
        assert!(guard.settle(t0 + ms(1000)));
        assert!(!guard.settle(t0 + ms(1001)));
    }

    #[test]
    fn test_move_without_start_is_ignored() {
        let mut guard = ScrollGuard::default();
        assert!(!guard.touch_move(500.0, Instant::now()));
        assert!(!guard.is_scrolling(Instant::now()));
    }
}
