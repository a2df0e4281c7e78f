//! SVG Renderer
//!
//! Serializes a [`ChartScene`] into a standalone SVG document. Every call
//! rebuilds the whole document; the tree is small and renders are driven
//! by polls, not frames.
//!
//! Animated renders start each bar at the baseline and attach SMIL
//! `<animate>` elements timed from the [`AnimationPlan`], so a browser
//! plays the grow-in without any script. Value labels count up from 0 in
//! discrete steps on the same eased timeline.

use std::time::Duration;

use super::animation::{ease_out_cubic, AnimationFrame, AnimationPlan, EASE_OUT_CUBIC_SPLINE};
use super::labels::escape_xml;
use super::layout::{Bar, ChartScene};

const BACKGROUND: &str = "#1f2937"; // gray-800
const GRID: &str = "#374151"; // gray-700
const AXIS_TEXT: &str = "#9ca3af"; // gray-400
const TITLE_TEXT: &str = "#f3f4f6"; // gray-100
const BAR_FILL: &str = "#FF9800";
const VALUE_TEXT: &str = "#fde68a";

const VALUE_LABEL_GAP: f64 = 6.0;
const X_LABEL_GAP: f64 = 18.0;

/// Discrete steps of the value label count-up
const COUNT_STEPS: u32 = 12;

/// Render a scene, optionally with its grow-in animation
pub fn render(scene: &ChartScene, animation: Option<&AnimationPlan>) -> String {
    let mut out = String::with_capacity(2048 + scene.bars.len() * 512);

    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="results-chart" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="{label}">"#,
        w = scene.width,
        h = scene.height,
        label = escape_xml(&format!("{} results", scene.title)),
    ));

    out.push_str(&format!(
        r#"<rect class="chart-bg" x="0" y="0" width="{}" height="{}" fill="{}" rx="8"/>"#,
        scene.width, scene.height, BACKGROUND
    ));

    out.push_str(&format!(
        r#"<text class="chart-title" x="{:.2}" y="16" fill="{}" font-size="14" font-weight="600">{}</text>"#,
        scene.plot.x,
        TITLE_TEXT,
        escape_xml(&scene.title)
    ));

    render_grid(&mut out, scene);

    out.push_str(r#"<g class="bars">"#);
    for bar in &scene.bars {
        render_bar(&mut out, scene, bar, animation);
    }
    out.push_str("</g>");

    render_x_labels(&mut out, scene);

    if scene.is_empty() {
        out.push_str(&format!(
            r#"<text class="empty-note" x="{:.2}" y="{:.2}" fill="{}" font-size="16" text-anchor="middle">No nominees</text>"#,
            scene.plot.x + scene.plot.width / 2.0,
            scene.plot.y + scene.plot.height / 2.0,
            AXIS_TEXT
        ));
    }

    out.push_str("</svg>");
    out
}

/// Render a single animation frame as a static document
pub fn render_frame(scene: &ChartScene, frame: &AnimationFrame) -> String {
    let mut frozen = scene.clone();
    for bar_frame in &frame.bars {
        if let Some(bar) = frozen.bars.get_mut(bar_frame.index) {
            bar.y = bar_frame.y;
            bar.height = bar_frame.height;
            bar.value = bar_frame.value;
        }
    }
    render(&frozen, None)
}

fn render_grid(out: &mut String, scene: &ChartScene) {
    out.push_str(r#"<g class="grid">"#);
    for line in &scene.gridlines {
        out.push_str(&format!(
            r#"<line x1="{:.2}" x2="{:.2}" y1="{y:.2}" y2="{y:.2}" stroke="{}" stroke-width="1"/>"#,
            scene.plot.x,
            scene.plot.right(),
            GRID,
            y = line.y,
        ));
        out.push_str(&format!(
            r#"<text class="tick" x="{:.2}" y="{:.2}" fill="{}" font-size="12" text-anchor="end">{}</text>"#,
            scene.plot.x - 6.0,
            line.y + 4.0,
            AXIS_TEXT,
            escape_xml(&line.label)
        ));
    }
    out.push_str("</g>");
}

/// Value label counting from 0 to `value` on the bar's eased timeline.
///
/// SMIL cannot animate text content, so each step is its own `<tspan>`
/// switched on by a `<set>` at its start and off when the next begins.
fn render_count_up(out: &mut String, value: u64, begin: Duration, run: Duration) {
    let begin_ms = begin.as_secs_f64() * 1000.0;
    let run_ms = run.as_secs_f64() * 1000.0;

    let mut steps: Vec<(u64, f64)> = Vec::new();
    for k in 0..=COUNT_STEPS {
        let fraction = k as f64 / COUNT_STEPS as f64;
        let shown = (value as f64 * ease_out_cubic(fraction)).round() as u64;
        let at = begin_ms + run_ms * fraction;
        match steps.last() {
            Some(&(last, _)) if last == shown => {}
            _ => steps.push((shown, at)),
        }
    }
    // Rounding may stop short of the exact value for huge counts
    if let Some(last) = steps.last_mut() {
        last.0 = value;
    }

    for (i, &(shown, at)) in steps.iter().enumerate() {
        out.push_str(&format!(
            r#"<tspan display="none">{shown}<set attributeName="display" to="inline" begin="{at:.0}ms"/>"#
        ));
        if let Some(&(_, next)) = steps.get(i + 1) {
            out.push_str(&format!(
                r#"<set attributeName="display" to="none" begin="{next:.0}ms"/>"#
            ));
        }
        out.push_str("</tspan>");
    }
}

fn render_bar(out: &mut String, scene: &ChartScene, bar: &Bar, animation: Option<&AnimationPlan>) {
    let baseline = scene.baseline();
    let name = escape_xml(&bar.name);
    let label_y = bar.y - VALUE_LABEL_GAP;

    match animation {
        Some(plan) => {
            let (begin, run) = plan.bar_timing(bar.index);
            let timing = format!(
                r#"begin="{}ms" dur="{}ms" calcMode="spline" keyTimes="0;1" keySplines="{}" fill="freeze""#,
                begin.as_millis(),
                run.as_millis().max(1),
                EASE_OUT_CUBIC_SPLINE
            );

            out.push_str(&format!(
                r#"<rect class="bar" data-index="{i}" data-name="{name}" data-value="{v}" x="{x:.2}" y="{base:.2}" width="{w:.2}" height="0" fill="{fill}" rx="3">"#,
                i = bar.index,
                v = bar.value,
                x = bar.x,
                base = baseline,
                w = bar.width,
                fill = BAR_FILL,
            ));
            out.push_str(&format!(
                r#"<animate attributeName="y" from="{:.2}" to="{:.2}" {timing}/>"#,
                baseline, bar.y
            ));
            out.push_str(&format!(
                r#"<animate attributeName="height" from="0" to="{:.2}" {timing}/>"#,
                bar.height
            ));
            out.push_str("</rect>");

            out.push_str(&format!(
                r#"<text class="value-label" x="{:.2}" y="{:.2}" fill="{}" font-size="12" text-anchor="middle" opacity="0">"#,
                bar.center_x(),
                baseline - VALUE_LABEL_GAP,
                VALUE_TEXT,
            ));
            render_count_up(out, bar.value, begin, run);
            out.push_str(&format!(
                r#"<animate attributeName="y" from="{:.2}" to="{:.2}" {timing}/>"#,
                baseline - VALUE_LABEL_GAP,
                label_y
            ));
            out.push_str(&format!(
                r#"<animate attributeName="opacity" from="0" to="1" {timing}/>"#
            ));
            out.push_str("</text>");
        }
        None => {
            out.push_str(&format!(
                r#"<rect class="bar" data-index="{i}" data-name="{name}" data-value="{v}" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" rx="3"/>"#,
                i = bar.index,
                v = bar.value,
                x = bar.x,
                y = bar.y,
                w = bar.width,
                h = bar.height,
                fill = BAR_FILL,
            ));
            out.push_str(&format!(
                r#"<text class="value-label" x="{:.2}" y="{:.2}" fill="{}" font-size="12" text-anchor="middle">{}</text>"#,
                bar.center_x(),
                label_y,
                VALUE_TEXT,
                bar.value
            ));
        }
    }
}

fn render_x_labels(out: &mut String, scene: &ChartScene) {
    out.push_str(r#"<g class="x-labels">"#);
    let y = scene.baseline() + X_LABEL_GAP;
    for bar in &scene.bars {
        let x = bar.band_x + bar.band_width / 2.0;
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" fill="{}" font-size="11" text-anchor="middle">"#,
            x, y, AXIS_TEXT
        ));
        for (line_no, line) in bar.label_lines.iter().enumerate() {
            let dy = if line_no == 0 { "0" } else { "1.2em" };
            out.push_str(&format!(
                r#"<tspan x="{:.2}" dy="{}">{}</tspan>"#,
                x,
                dy,
                escape_xml(line)
            ));
        }
        out.push_str("</text>");
    }
    out.push_str("</g>");
}
