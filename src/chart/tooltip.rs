//! Hover tooltip hit-testing

use serde::{Deserialize, Serialize};

use super::layout::ChartScene;

/// Approximate tooltip box size, used to keep it inside the chart
pub const TOOLTIP_WIDTH: f64 = 140.0;
pub const TOOLTIP_HEIGHT: f64 = 40.0;

const POINTER_OFFSET_X: f64 = 12.0;
const POINTER_OFFSET_Y: f64 = -28.0;

/// Tooltip content and position in canvas coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub index: usize,
    pub name: String,
    pub value: u64,
    pub x: f64,
    pub y: f64,
}

impl ChartScene {
    /// Bar under a pointer position, as a positioned tooltip.
    ///
    /// The whole band column inside the plot area counts as the bar, so
    /// zero-vote nominees can still be hovered.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Tooltip> {
        if self.bars.is_empty() || !self.plot.contains(x, y) {
            return None;
        }

        let bar = self
            .bars
            .iter()
            .find(|bar| x >= bar.band_x && x < bar.band_x + bar.band_width)?;

        let max_x = (self.width - TOOLTIP_WIDTH).max(0.0);
        let max_y = (self.height - TOOLTIP_HEIGHT).max(0.0);

        Some(Tooltip {
            index: bar.index,
            name: bar.name.clone(),
            value: bar.value,
            x: (x + POINTER_OFFSET_X).clamp(0.0, max_x),
            y: (y + POINTER_OFFSET_Y).clamp(0.0, max_y),
        })
    }
}
