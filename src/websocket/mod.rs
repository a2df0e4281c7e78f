//! WebSocket Live View
//!
//! Streams a live chart to a page and takes its selections and browser
//! signals back.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Tracks open connections for viewer counts and
//!   host-wide notices
//! - **Handler**: Upgrades the connection and runs one chart session per
//!   viewer
//! - **Messages**: Client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8090/api/v1/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'chart') mount.innerHTML = msg.svg;
//! };
//!
//! document.addEventListener('visibilitychange', () => {
//!   ws.send(JSON.stringify({type: 'visibility', hidden: document.hidden}));
//! });
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
