//! WebSocket Client
//!
//! Live-view connection to the chart host. The host owns one chart per
//! connection, so a reconnect starts a fresh chart on the first category.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::global::{CategoryOption, ChartView, GlobalState, Tooltip};

const MAX_RECONNECT_ATTEMPTS: u32 = 8;

/// Messages from the host
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Connected {
        connection_id: String,
    },
    Options {
        active: usize,
        options: Vec<CategoryOption>,
    },
    Chart {
        index: usize,
        title: String,
        svg: String,
        animated: bool,
        axis_max: u64,
    },
    Tooltip {
        tooltip: Tooltip,
    },
    TooltipHidden,
    Sheet {
        scrolling: bool,
    },
    Reset {
        issued_at: String,
    },
    Pong,
    Error {
        message: String,
    },
}

/// Messages to the host
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Select { index: usize },
    Replay,
    Visibility { hidden: bool },
    Hover { x: f64, y: f64 },
    PointerLeave,
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
    SheetTap { index: usize },
    ResetSignal,
    Ping,
}

/// WebSocket client with exponential reconnect
#[derive(Clone)]
pub struct WebSocketClient {
    ws: Rc<RefCell<Option<WebSocket>>>,
    url: String,
    reconnect_attempts: Rc<RefCell<u32>>,
}

impl WebSocketClient {
    pub fn new(url: &str) -> Self {
        Self {
            ws: Rc::new(RefCell::new(None)),
            url: url.to_string(),
            reconnect_attempts: Rc::new(RefCell::new(0)),
        }
    }

    /// Connect to the WebSocket server
    pub fn connect(&self, state: GlobalState) {
        match WebSocket::new(&self.url) {
            Ok(ws) => {
                self.setup_handlers(&ws, state);
                *self.ws.borrow_mut() = Some(ws);
            }
            Err(e) => {
                web_sys::console::error_1(&format!("WebSocket connection failed: {:?}", e).into());
                self.schedule_reconnect(state);
            }
        }
    }

    fn setup_handlers(&self, ws: &WebSocket, state: GlobalState) {
        // On open
        let state_clone = state.clone();
        let reconnect_clone = Rc::clone(&self.reconnect_attempts);
        let client = self.clone();
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            web_sys::console::log_1(&"WebSocket connected".into());
            state_clone.ws_connected.set(true);
            *reconnect_clone.borrow_mut() = 0;

            // A fresh session polls as if visible; correct it right away
            if crate::browser::document_hidden() {
                let _ = client.send(&ClientMessage::Visibility { hidden: true });
            }
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        // On message
        let state_clone = state.clone();
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
                let text_str: String = text.into();
                handle_message(&text_str, &state_clone);
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        on_message.forget();

        // On close
        let state_clone = state.clone();
        let client = self.clone();
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            web_sys::console::log_1(
                &format!("WebSocket closed: code={}, reason={}", event.code(), event.reason()).into(),
            );
            state_clone.ws_connected.set(false);
            client.schedule_reconnect(state_clone.clone());
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        // On error
        let on_error = Closure::wrap(Box::new(move |e: JsValue| {
            web_sys::console::error_1(&format!("WebSocket error: {:?}", e).into());
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();
    }

    fn schedule_reconnect(&self, state: GlobalState) {
        let attempts = *self.reconnect_attempts.borrow();
        if attempts >= MAX_RECONNECT_ATTEMPTS {
            web_sys::console::error_1(&"Max reconnect attempts reached".into());
            state.show_error("Live results unavailable. Reload the page to retry.");
            return;
        }

        let delay = reconnect_delay_ms(attempts);
        *self.reconnect_attempts.borrow_mut() = attempts + 1;

        let client = self.clone();
        gloo_timers::callback::Timeout::new(delay, move || {
            web_sys::console::log_1(&format!("Attempting reconnect (attempt {})", attempts + 1).into());
            client.connect(state);
        })
        .forget();
    }

    /// Send a message to the server
    pub fn send(&self, message: &ClientMessage) -> Result<(), String> {
        let ws_guard = self.ws.borrow();
        let ws = ws_guard.as_ref().ok_or("WebSocket not connected")?;
        if ws.ready_state() != WebSocket::OPEN {
            return Err("WebSocket not open".to_string());
        }

        let json = serde_json::to_string(message).map_err(|e| e.to_string())?;
        ws.send_with_str(&json).map_err(|e| format!("{:?}", e))
    }
}

/// 1s, 2s, 4s ... capped at 30s
fn reconnect_delay_ms(attempts: u32) -> u32 {
    2_u32.saturating_pow(attempts).saturating_mul(1000).min(30_000)
}

/// Handle incoming WebSocket message
fn handle_message(text: &str, state: &GlobalState) {
    let msg = match serde_json::from_str::<WsMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            web_sys::console::error_1(&format!("Failed to parse WebSocket message: {}", e).into());
            return;
        }
    };

    match msg {
        WsMessage::Connected { connection_id } => {
            web_sys::console::log_1(&format!("Connected with ID: {}", connection_id).into());
        }
        WsMessage::Options { active, options } => {
            state.options.set(options);
            state.active.set(active);
        }
        WsMessage::Chart {
            index,
            title,
            svg,
            animated,
            axis_max,
        } => {
            // Markup changes under the pointer; any tooltip is now stale
            state.tooltip.set(None);
            state.chart.set(Some(ChartView {
                index,
                title,
                svg,
                animated,
                axis_max,
            }));
            state
                .last_update
                .set(Some(chrono::Utc::now().timestamp_millis()));
        }
        WsMessage::Tooltip { tooltip } => state.tooltip.set(Some(tooltip)),
        WsMessage::TooltipHidden => state.tooltip.set(None),
        WsMessage::Sheet { scrolling } => state.sheet_scrolling.set(scrolling),
        WsMessage::Reset { issued_at } => {
            web_sys::console::log_1(&format!("Votes reset at {}", issued_at).into());
            state.show_info("Votes were reset");
        }
        WsMessage::Pong => {
            // Connection alive
        }
        WsMessage::Error { message } => {
            web_sys::console::error_1(&format!("Server error: {}", message).into());
            state.show_error(&message);
        }
    }
}

/// Live-view URL for an HTTP API base ending in `/api/v1`
pub fn ws_url(api_base: &str) -> String {
    let base = api_base
        .replacen("http://", "ws://", 1)
        .replacen("https://", "wss://", 1);
    format!("{}/ws", base.trim_end_matches('/'))
}

/// Initialize WebSocket connection (call from app root)
pub fn init_websocket(state: GlobalState, api_base: &str) {
    let client = WebSocketClient::new(&ws_url(api_base));
    client.connect(state.clone());
    state.attach_socket(client);
}
