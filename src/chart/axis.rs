//! Axis Scaler
//!
//! Y-axis maximum that only ratchets upward within a chart instance.
//! Vote counts can drop (e.g. after an admin reset) but the scale must
//! not visibly shrink while results are live; only a fresh instance
//! starts from the baseline again.

use serde::{Deserialize, Serialize};

/// Baseline axis maximum
pub const MIN_MAX: u64 = 50;

/// Rounding step for the axis maximum
pub const STEP: u64 = 10;

/// Current axis scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisState {
    pub current_max: u64,
}

/// Ratchet-style axis scaler
#[derive(Debug, Clone)]
pub struct AxisScaler {
    min_max: u64,
    step: u64,
    state: AxisState,
}

impl Default for AxisScaler {
    fn default() -> Self {
        Self::new(MIN_MAX, STEP)
    }
}

impl AxisScaler {
    /// Create a scaler seeded at `min_max`
    pub fn new(min_max: u64, step: u64) -> Self {
        Self {
            min_max,
            step: step.max(1),
            state: AxisState {
                current_max: min_max,
            },
        }
    }

    pub fn current_max(&self) -> u64 {
        self.state.current_max
    }

    pub fn state(&self) -> AxisState {
        self.state
    }

    /// Feed a snapshot of values; grows the maximum if any value exceeds it.
    pub fn observe<I>(&mut self, values: I) -> u64
    where
        I: IntoIterator<Item = u64>,
    {
        let local_max = values.into_iter().max().unwrap_or(0);

        if local_max > self.state.current_max {
            let rounded = local_max
                .div_ceil(self.step)
                .checked_mul(self.step)
                .unwrap_or(local_max);
            self.state.current_max = rounded.max(self.min_max);
        }

        self.state.current_max
    }

    /// Back to the baseline. Only for a full reload of the chart instance.
    pub fn reset(&mut self) {
        self.state.current_max = self.min_max;
    }

    /// `count + 1` evenly spaced tick values from 0 to the current maximum
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks_for(self.state, count)
    }
}

/// Tick values for an axis state
pub fn ticks_for(state: AxisState, count: usize) -> Vec<f64> {
    let count = count.max(1);
    let max = state.current_max as f64;
    (0..=count)
        .map(|i| max * i as f64 / count as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_at_baseline() {
        assert_eq!(AxisScaler::default().current_max(), 50);
    }

    #[test]
    fn test_below_baseline_stays_at_baseline() {
        let mut axis = AxisScaler::default();
        assert_eq!(axis.observe([47, 3, 0]), 50);
    }

    #[test]
    fn test_rounds_up_to_next_step() {
        let mut axis = AxisScaler::default();
        assert_eq!(axis.observe([53]), 60);
    }

    #[test]
    fn test_exact_multiple_is_kept() {
        let mut axis = AxisScaler::default();
        assert_eq!(axis.observe([70]), 70);
    }

    #[test]
    fn test_never_shrinks() {
        let mut axis = AxisScaler::default();
        let snapshots: [&[u64]; 6] = [&[10], &[48], &[61], &[95], &[12], &[0]];

        let mut previous = axis.current_max();
        for snapshot in snapshots {
            let max = axis.observe(snapshot.iter().copied());
            assert!(max >= previous, "axis shrank from {} to {}", previous, max);
            previous = max;
        }

        assert_eq!(axis.current_max(), 100);
    }

    #[test]
    fn test_empty_snapshot_keeps_max() {
        let mut axis = AxisScaler::default();
        axis.observe([120]);
        assert_eq!(axis.observe(std::iter::empty()), 120);
    }

    #[test]
    fn test_ticks() {
        let mut axis = AxisScaler::default();
        axis.observe([53]);
        assert_eq!(axis.ticks(5), vec![0.0, 12.0, 24.0, 36.0, 48.0, 60.0]);
    }

    #[test]
    fn test_zero_step_treated_as_one() {
        let mut axis = AxisScaler::new(5, 0);
        assert_eq!(axis.observe([7]), 7);
    }

    #[test]
    fn test_huge_value_does_not_overflow() {
        let mut axis = AxisScaler::default();
        assert_eq!(axis.observe([u64::MAX - 3]), u64::MAX - 3);
        assert_eq!(axis.observe([u64::MAX]), u64::MAX);
    }

    #[test]
    fn test_reset_returns_to_baseline() {
        let mut axis = AxisScaler::default();
        axis.observe([230]);
        axis.reset();
        assert_eq!(axis.current_max(), 50);
    }
}
