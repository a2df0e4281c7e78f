//! Animation Driver
//!
//! Grow-in animation for a category's first render. Bars and value labels
//! rise from zero with an ease-out-cubic curve; later bars start slightly
//! later but every bar finishes at the same deadline:
//!
//! ```text
//! local_t(i) = clamp((t - i * stagger) / (1 - i * stagger), 0, 1)
//! ```
//!
//! Routine refreshes carry no plan at all and are drawn at final values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::layout::ChartScene;

/// Default grow-in duration
pub const DEFAULT_DURATION_MS: u64 = 900;

/// Default per-bar start offset, as a fraction of the duration
pub const DEFAULT_STAGGER: f64 = 0.06;

/// Upper bound on the last bar's start offset
pub const MAX_TOTAL_STAGGER: f64 = 0.6;

/// Key spline approximating ease-out-cubic for SMIL
pub const EASE_OUT_CUBIC_SPLINE: &str = "0.33 1 0.68 1";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub stagger: f64,
    /// Frame spacing for frame-by-frame playback
    pub frame_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            stagger: DEFAULT_STAGGER,
            frame_interval_ms: 16,
        }
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Per-bar progress for global progress `t`
pub fn local_progress(index: usize, t: f64, stagger: f64) -> f64 {
    let offset = index as f64 * stagger;
    if offset >= 1.0 {
        return if t >= 1.0 { 1.0 } else { 0.0 };
    }
    ((t - offset) / (1.0 - offset)).clamp(0.0, 1.0)
}

/// Stagger capped so the last of `bars` still has time to grow
pub fn effective_stagger(stagger: f64, bars: usize) -> f64 {
    let stagger = stagger.max(0.0);
    if bars <= 1 {
        return stagger;
    }
    stagger.min(MAX_TOTAL_STAGGER / (bars - 1) as f64)
}

/// Final geometry of one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarTarget {
    pub index: usize,
    pub value: u64,
    pub height: f64,
    pub baseline: f64,
}

/// A grow-in animation for one rendered scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationPlan {
    pub duration_ms: u64,
    pub stagger: f64,
    pub targets: Vec<BarTarget>,
}

/// Bar state at one instant of the animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarFrame {
    pub index: usize,
    pub y: f64,
    pub height: f64,
    /// Value label text at this instant
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub elapsed_ms: u64,
    /// Global time fraction in `[0, 1]`
    pub t: f64,
    pub bars: Vec<BarFrame>,
}

impl AnimationPlan {
    pub fn for_scene(scene: &ChartScene, config: &AnimationConfig) -> Self {
        let baseline = scene.baseline();
        let targets = scene
            .bars
            .iter()
            .map(|bar| BarTarget {
                index: bar.index,
                value: bar.value,
                height: bar.height,
                baseline,
            })
            .collect::<Vec<_>>();

        Self {
            duration_ms: config.duration_ms.max(1),
            stagger: effective_stagger(config.stagger, targets.len()),
            targets,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Global time fraction for an elapsed time
    pub fn progress(&self, elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() / self.duration().as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.progress(elapsed) >= 1.0
    }

    /// Start offset and run time of one bar
    pub fn bar_timing(&self, index: usize) -> (Duration, Duration) {
        let offset = (index as f64 * self.stagger).min(1.0);
        let duration = self.duration().as_secs_f64();
        (
            Duration::from_secs_f64(offset * duration),
            Duration::from_secs_f64((1.0 - offset) * duration),
        )
    }

    pub fn frame_at(&self, elapsed: Duration) -> AnimationFrame {
        let t = self.progress(elapsed);
        let bars = self
            .targets
            .iter()
            .map(|target| {
                let eased = ease_out_cubic(local_progress(target.index, t, self.stagger));
                let height = target.height * eased;
                BarFrame {
                    index: target.index,
                    y: target.baseline - height,
                    height,
                    value: (target.value as f64 * eased).round() as u64,
                }
            })
            .collect();

        AnimationFrame {
            elapsed_ms: elapsed.as_millis() as u64,
            t,
            bars,
        }
    }

    /// Frames from start to finish at a fixed spacing; stops after the
    /// frame where the time fraction reaches 1.
    pub fn frames(&self, interval: Duration) -> Frames<'_> {
        Frames {
            plan: self,
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            done: false,
        }
    }
}

/// Self-terminating frame sequence
pub struct Frames<'a> {
    plan: &'a AnimationPlan,
    interval: Duration,
    elapsed: Duration,
    done: bool,
}

impl Iterator for Frames<'_> {
    type Item = AnimationFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let frame = self.plan.frame_at(self.elapsed);
        if self.plan.is_finished(self.elapsed) {
            self.done = true;
        } else {
            self.elapsed = (self.elapsed + self.interval).min(self.plan.duration());
        }

        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::axis::AxisState;
    use crate::chart::data::ChartDataPoint;
    use crate::chart::layout::{build_scene, ChartLayout};

    fn scene(values: &[u64]) -> ChartScene {
        let points: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| ChartDataPoint {
                name: format!("N{}", i),
                value,
            })
            .collect();
        build_scene("T", &points, AxisState { current_max: 50 }, &ChartLayout::default())
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_local_progress_stagger() {
        // Bar 2 with stagger 0.1 starts at t = 0.2
        assert_eq!(local_progress(2, 0.1, 0.1), 0.0);
        assert!((local_progress(2, 0.6, 0.1) - 0.5).abs() < 1e-9);
        assert_eq!(local_progress(2, 1.0, 0.1), 1.0);
        assert_eq!(local_progress(0, 0.5, 0.1), 0.5);
    }

    #[test]
    fn test_effective_stagger_capped() {
        assert_eq!(effective_stagger(0.06, 3), 0.06);
        assert!((effective_stagger(0.06, 31) - 0.02).abs() < 1e-12);
        assert_eq!(effective_stagger(-1.0, 3), 0.0);
    }

    #[test]
    fn test_first_frame_is_zero_last_is_final() {
        let scene = scene(&[10, 40, 25]);
        let plan = AnimationPlan::for_scene(&scene, &AnimationConfig::default());

        let first = plan.frame_at(Duration::ZERO);
        assert!(first.bars.iter().all(|b| b.height == 0.0 && b.value == 0));

        let last = plan.frame_at(plan.duration());
        for (frame, bar) in last.bars.iter().zip(&scene.bars) {
            assert!((frame.height - bar.height).abs() < 1e-9);
            assert!((frame.y - bar.y).abs() < 1e-9);
            assert_eq!(frame.value, bar.value);
        }
    }

    #[test]
    fn test_later_bars_lag_behind() {
        let scene = scene(&[40, 40, 40]);
        let plan = AnimationPlan::for_scene(&scene, &AnimationConfig::default());

        let frame = plan.frame_at(Duration::from_millis(200));
        assert!(frame.bars[0].height > frame.bars[1].height);
        assert!(frame.bars[1].height > frame.bars[2].height);
    }

    #[test]
    fn test_frames_terminate_at_duration() {
        let scene = scene(&[10, 20]);
        let plan = AnimationPlan::for_scene(&scene, &AnimationConfig::default());

        let frames: Vec<_> = plan.frames(Duration::from_millis(100)).collect();

        // 0, 100, ..., 900
        assert_eq!(frames.len(), 10);
        assert_eq!(frames.last().unwrap().t, 1.0);
        assert_eq!(frames.last().unwrap().elapsed_ms, 900);
    }

    #[test]
    fn test_bar_timing() {
        let scene = scene(&[10, 20, 30]);
        let plan = AnimationPlan::for_scene(&scene, &AnimationConfig::default());

        let (begin, run) = plan.bar_timing(2);
        assert!((begin.as_secs_f64() - 0.108).abs() < 1e-6);
        assert!(((begin + run).as_secs_f64() - 0.9).abs() < 1e-6);
    }
}
