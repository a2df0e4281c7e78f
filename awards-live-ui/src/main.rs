//! Awards Live Page Adapter
//!
//! Live results chart for an awards event page, built with Leptos (WASM).
//!
//! # Architecture
//!
//! The chart host does all the work: polling, the ratcheting axis, layout
//! and SVG rendering. This crate only mounts what the host sends over the
//! WebSocket, renders the category selector (dropdown, pill row, bottom
//! sheet) and forwards browser signals back: page visibility, the
//! cross-tab vote-reset marker, touch gestures and pointer hover.

use leptos::*;

mod app;
mod browser;
mod components;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
