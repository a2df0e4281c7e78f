//! Global Page State
//!
//! Reactive state management using Leptos signals. Everything here mirrors
//! what the chart host last sent.

use leptos::*;

use super::websocket::{ClientMessage, WebSocketClient};

/// Global page state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// Category options in catalog order
    pub options: RwSignal<Vec<CategoryOption>>,
    /// Index of the selected option
    pub active: RwSignal<usize>,
    /// Latest chart from the host
    pub chart: RwSignal<Option<ChartView>>,
    /// Tooltip under the pointer, if any
    pub tooltip: RwSignal<Option<Tooltip>>,
    /// Bottom sheet open (mobile affordance)
    pub sheet_open: RwSignal<bool>,
    /// Sheet taps currently suppressed by a scroll
    pub sheet_scrolling: RwSignal<bool>,
    /// WebSocket connection status
    pub ws_connected: RwSignal<bool>,
    /// When the last chart arrived
    pub last_update: RwSignal<Option<i64>>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Info message (for toasts)
    pub info: RwSignal<Option<String>>,
    socket: StoredValue<Option<WebSocketClient>>,
}

/// One selectable category
#[derive(Clone, Debug, serde::Deserialize, PartialEq)]
pub struct CategoryOption {
    pub index: usize,
    pub number: u32,
    pub label: String,
}

/// A rendered chart as mounted on the page
#[derive(Clone, Debug, PartialEq)]
pub struct ChartView {
    pub index: usize,
    pub title: String,
    pub svg: String,
    pub animated: bool,
    pub axis_max: u64,
}

#[derive(Clone, Debug, serde::Deserialize, PartialEq)]
pub struct Tooltip {
    pub index: usize,
    pub name: String,
    pub value: u64,
    pub x: f64,
    pub y: f64,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        options: create_rw_signal(Vec::new()),
        active: create_rw_signal(0),
        chart: create_rw_signal(None),
        tooltip: create_rw_signal(None),
        sheet_open: create_rw_signal(false),
        sheet_scrolling: create_rw_signal(false),
        ws_connected: create_rw_signal(false),
        last_update: create_rw_signal(None),
        error: create_rw_signal(None),
        info: create_rw_signal(None),
        socket: store_value(None),
    };

    provide_context(state);
}

impl GlobalState {
    pub fn attach_socket(&self, client: WebSocketClient) {
        self.socket.set_value(Some(client));
    }

    /// Send to the host; dropped silently while disconnected
    pub fn send(&self, message: ClientMessage) {
        self.socket.with_value(|socket| {
            if let Some(client) = socket {
                if let Err(e) = client.send(&message) {
                    web_sys::console::warn_1(&format!("Send failed: {}", e).into());
                }
            }
        });
    }

    pub fn select(&self, index: usize) {
        self.sheet_open.set(false);
        self.send(ClientMessage::Select { index });
    }

    /// Title of the active option, if options have arrived
    pub fn active_label(&self) -> Option<String> {
        let active = self.active.get();
        self.options
            .with(|options| options.iter().find(|o| o.index == active).map(|o| o.label.clone()))
    }

    /// Show an info message (auto-clears after timeout)
    pub fn show_info(&self, message: &str) {
        self.info.set(Some(message.to_string()));

        let info_signal = self.info;
        gloo_timers::callback::Timeout::new(3000, move || {
            info_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}
