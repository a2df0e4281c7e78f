//! App Root Component
//!
//! Wires global state, the host connection and browser listeners, then
//! lays out the selector affordances around the chart.

use leptos::*;

use crate::browser;
use crate::components::{BottomSheet, CategorySelect, ChartMount, PillRow, Toast};
use crate::state::websocket::init_websocket;
use crate::state::{provide_global_state, GlobalState};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state();

    let state = use_context::<GlobalState>().expect("GlobalState not found");
    init_websocket(state.clone(), &browser::get_api_base());
    browser::install_listeners(state);

    view! {
        <div class="awards-live">
            <nav class="category-nav">
                <CategorySelect />
                <PillRow />
                <BottomSheet />
            </nav>

            <main>
                <ChartMount />
            </main>

            <Footer />
            <Toast />
        </div>
    }
}

/// Footer component showing connection status
#[component]
fn Footer() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        <footer class="status-bar">
            {move || {
                if state.ws_connected.get() {
                    view! { <span class="status live">"Live"</span> }.into_view()
                } else {
                    view! { <span class="status offline">"Reconnecting..."</span> }.into_view()
                }
            }}

            <span class="last-update">
                {move || {
                    state.last_update.get()
                        .and_then(chrono::DateTime::from_timestamp_millis)
                        .map(|dt| format!("Updated {}", dt.format("%H:%M:%S")))
                        .unwrap_or_else(|| "No results yet".to_string())
                }}
            </span>

            <span class="axis">
                {move || {
                    state.chart.with(|c| c.as_ref().map(|c| format!("Scale 0-{}", c.axis_max)))
                }}
            </span>
        </footer>
    }
}
