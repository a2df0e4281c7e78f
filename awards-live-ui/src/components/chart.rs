//! Chart Mount
//!
//! Mounts the host-rendered SVG and forwards pointer positions in chart
//! (viewBox) coordinates so the host can hit-test bars.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent};

use crate::state::{ClientMessage, GlobalState};

/// Live results chart
#[component]
pub fn ChartMount() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let chart = state.chart;
    let tooltip = state.tooltip;

    let on_move = {
        let state = state.clone();
        move |ev: MouseEvent| {
            let Some(target) = ev
                .current_target()
                .and_then(|t| t.dyn_into::<Element>().ok())
            else {
                return;
            };
            if let Some((x, y)) = to_chart_coords(&target, ev.client_x() as f64, ev.client_y() as f64) {
                state.send(ClientMessage::Hover { x, y });
            }
        }
    };
    let on_leave = {
        let state = state.clone();
        move |_: MouseEvent| {
            state.tooltip.set(None);
            state.send(ClientMessage::PointerLeave);
        }
    };
    let on_replay = move |_| state.send(ClientMessage::Replay);

    view! {
        <section class="chart-panel">
            <header class="chart-header">
                <h2>{move || chart.with(|c| c.as_ref().map(|c| c.title.clone()).unwrap_or_default())}</h2>
                <button class="replay" on:click=on_replay>"Replay"</button>
            </header>

            <div class="chart-stage">
                {move || {
                    if chart.with(|c| c.is_none()) {
                        view! { <div class="chart-loading">"Waiting for results..."</div> }.into_view()
                    } else {
                        view! {}.into_view()
                    }
                }}

                <div
                    class="chart-mount"
                    class:animated=move || chart.with(|c| c.as_ref().map(|c| c.animated).unwrap_or(false))
                    data-index=move || chart.with(|c| c.as_ref().map(|c| c.index.to_string()).unwrap_or_default())
                    on:mousemove=on_move
                    on:mouseleave=on_leave
                    inner_html=move || chart.with(|c| c.as_ref().map(|c| c.svg.clone()).unwrap_or_default())
                />

                {move || tooltip.get().map(|tip| {
                    let (w, h) = chart_size();
                    view! {
                        <div
                            class="chart-tooltip"
                            role="tooltip"
                            data-index=tip.index.to_string()
                            style=format!(
                                "left: {:.2}%; top: {:.2}%",
                                tip.x / w * 100.0,
                                tip.y / h * 100.0
                            )
                        >
                            <strong>{tip.name}</strong>
                            <span>{format!("{} votes", tip.value)}</span>
                        </div>
                    }
                })}
            </div>
        </section>
    }
}

/// Canvas size of the mounted SVG, from its viewBox
fn chart_size() -> (f64, f64) {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector(".chart-mount svg").ok().flatten())
        .and_then(|svg| svg.get_attribute("viewBox"))
        .and_then(|vb| parse_view_box(&vb))
        .unwrap_or((800.0, 420.0))
}

fn to_chart_coords(mount: &Element, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
    let svg = mount.first_element_child()?;
    let (width, height) = parse_view_box(&svg.get_attribute("viewBox")?)?;
    let rect = svg.get_bounding_client_rect();
    scale_point(
        (client_x - rect.left(), client_y - rect.top()),
        (rect.width(), rect.height()),
        (width, height),
    )
}

/// Width and height from `"min-x min-y width height"`
fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let parts = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    match parts.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((*w, *h)),
        _ => None,
    }
}

/// Map a point from displayed pixels to viewBox units
fn scale_point(offset: (f64, f64), displayed: (f64, f64), view: (f64, f64)) -> Option<(f64, f64)> {
    if displayed.0 <= 0.0 || displayed.1 <= 0.0 {
        return None;
    }
    Some((
        offset.0 * view.0 / displayed.0,
        offset.1 * view.1 / displayed.1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_box() {
        assert_eq!(parse_view_box("0 0 800 420"), Some((800.0, 420.0)));
        assert_eq!(parse_view_box("0,0,640,360"), Some((640.0, 360.0)));
        assert_eq!(parse_view_box("0 0 800"), None);
        assert_eq!(parse_view_box("0 0 0 420"), None);
    }

    #[test]
    fn test_scale_point_half_size() {
        let point = scale_point((200.0, 105.0), (400.0, 210.0), (800.0, 420.0));
        assert_eq!(point, Some((400.0, 210.0)));
    }

    #[test]
    fn test_scale_point_hidden_element() {
        assert_eq!(scale_point((1.0, 1.0), (0.0, 0.0), (800.0, 420.0)), None);
    }
}
