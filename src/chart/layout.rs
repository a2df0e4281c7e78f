//! Chart Layout
//!
//! Turns a data snapshot and an axis state into a declarative scene:
//! gridlines, tick labels, bars and x-axis labels in canvas coordinates.
//! Nothing here touches SVG or the DOM, so the geometry is testable on
//! its own.

use serde::{Deserialize, Serialize};

use super::axis::{ticks_for, AxisState};
use super::data::ChartDataPoint;
use super::labels::{format_tick, wrap_label};

/// Fixed logical canvas and spacing rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    /// Fraction of each band left empty around the bar
    pub band_padding: f64,
    pub min_bar_width: f64,
    /// Number of tick intervals; `ticks + 1` gridlines are drawn
    pub ticks: usize,
    /// Hard-split length for names without whitespace
    pub label_split: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 420.0,
            margin: Margin::default(),
            band_padding: 0.2,
            min_bar_width: 6.0,
            ticks: 5,
            label_split: 12,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 24.0,
            right: 16.0,
            bottom: 64.0,
            left: 48.0,
        }
    }
}

impl ChartLayout {
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    pub fn plot_area(&self) -> PlotArea {
        PlotArea {
            x: self.margin.left,
            y: self.margin.top,
            width: self.inner_width(),
            height: self.inner_height(),
        }
    }
}

/// Inner plotting rectangle in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Horizontal gridline with its tick label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gridline {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

/// One bar, fully positioned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Position in the nominee list (0-based)
    pub index: usize,
    pub name: String,
    pub value: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Left edge and width of the bar's band
    pub band_x: f64,
    pub band_width: f64,
    /// Wrapped x-axis label (one or two lines)
    pub label_lines: Vec<String>,
}

impl Bar {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// Declarative description of one chart render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartScene {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub plot: PlotArea,
    pub axis_max: u64,
    pub gridlines: Vec<Gridline>,
    pub bars: Vec<Bar>,
}

impl ChartScene {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Baseline (value 0) in canvas coordinates
    pub fn baseline(&self) -> f64 {
        self.plot.bottom()
    }
}

/// Map a value onto the plot's y range: `[0, axis_max] -> [bottom, top]`
pub fn y_for(value: f64, axis_max: u64, plot: &PlotArea) -> f64 {
    if axis_max == 0 {
        return plot.bottom();
    }
    let fraction = (value / axis_max as f64).clamp(0.0, 1.0);
    plot.bottom() - fraction * plot.height
}

/// Build the scene for a snapshot.
///
/// Bars keep the order of `points`.
pub fn build_scene(
    title: &str,
    points: &[ChartDataPoint],
    axis: AxisState,
    layout: &ChartLayout,
) -> ChartScene {
    let plot = layout.plot_area();

    let gridlines = ticks_for(axis, layout.ticks)
        .into_iter()
        .map(|value| Gridline {
            value,
            y: y_for(value, axis.current_max, &plot),
            label: format_tick(value),
        })
        .collect();

    let bars = if points.is_empty() {
        Vec::new()
    } else {
        let band_width = plot.width / points.len() as f64;
        let bar_width =
            (band_width * (1.0 - layout.band_padding.clamp(0.0, 1.0))).max(layout.min_bar_width);

        points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let band_x = plot.x + index as f64 * band_width;
                let y = y_for(point.value as f64, axis.current_max, &plot);
                Bar {
                    index,
                    name: point.name.clone(),
                    value: point.value,
                    x: band_x + (band_width - bar_width) / 2.0,
                    y,
                    width: bar_width,
                    height: plot.bottom() - y,
                    band_x,
                    band_width,
                    label_lines: wrap_label(&point.name, layout.label_split),
                }
            })
            .collect()
    };

    ChartScene {
        title: title.to_string(),
        width: layout.width,
        height: layout.height,
        plot,
        axis_max: axis.current_max,
        gridlines,
        bars,
    }
}
