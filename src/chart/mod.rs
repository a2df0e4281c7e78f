//! Results Chart
//!
//! Everything needed to draw a category's live results as a bar chart,
//! independent of any DOM:
//!
//! - [`axis`]: ratchet-style Y-axis maximum
//! - [`data`]: nominee/results join
//! - [`layout`]: declarative scene (bars, gridlines, labels)
//! - [`animation`]: grow-in timing and frames
//! - [`svg`]: scene serialization
//! - [`tooltip`]: hover hit-testing
//!
//! ## Example
//!
//! ```rust
//! use awards_live::catalog::Category;
//! use awards_live::chart::{build_scene, join_results, svg, AxisScaler, ChartLayout};
//! use awards_live::results::{ResultRow, VoteCounts};
//!
//! let category = Category::new(1, "Best Newcomer", ["Alice", "Bob", "Carol"]);
//! let counts: VoteCounts = vec![ResultRow::new(1, 12), ResultRow::new(3, 7)]
//!     .into_iter()
//!     .collect();
//!
//! let points = join_results(&category, Some(&counts));
//! let mut axis = AxisScaler::default();
//! axis.observe(points.iter().map(|p| p.value));
//!
//! let scene = build_scene(&category.title, &points, axis.state(), &ChartLayout::default());
//! let document = svg::render(&scene, None);
//! assert!(document.contains("Alice"));
//! ```

pub mod animation;
pub mod axis;
pub mod data;
pub mod labels;
pub mod layout;
pub mod svg;
pub mod tooltip;

pub use animation::{AnimationConfig, AnimationFrame, AnimationPlan, BarFrame};
pub use axis::{AxisScaler, AxisState, MIN_MAX, STEP};
pub use data::{join_results, ChartDataPoint};
pub use layout::{build_scene, Bar, ChartLayout, ChartScene, Gridline, Margin, PlotArea};
pub use tooltip::Tooltip;

use serde::{Deserialize, Serialize};

/// Per-instance chart settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Baseline axis maximum
    pub min_max: u64,
    /// Axis rounding step
    pub step: u64,
    pub layout: ChartLayout,
    pub animation: AnimationConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            min_max: MIN_MAX,
            step: STEP,
            layout: ChartLayout::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl ChartConfig {
    /// Fresh axis scaler for a new chart instance
    pub fn axis(&self) -> AxisScaler {
        AxisScaler::new(self.min_max, self.step)
    }
}
