//! State Management
//!
//! Page state signals and the live-view WebSocket connection.

pub mod global;
pub mod websocket;

pub use global::{provide_global_state, GlobalState};
pub use websocket::{ClientMessage, WebSocketClient};
