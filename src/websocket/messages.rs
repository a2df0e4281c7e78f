//! WebSocket Message Types
//!
//! Messages exchanged between a live-view page and its chart session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{ChartDataPoint, Tooltip};
use crate::selector::{CategoryOption, SelectorView};
use crate::widget::RenderedChart;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Pick a category from the select or the pill row
    Select { index: usize },
    /// Play the grow-in again for the active category
    Replay,
    /// Page visibility changed
    Visibility { hidden: bool },
    /// Pointer position in chart canvas coordinates
    Hover { x: f64, y: f64 },
    PointerLeave,
    /// Bottom-sheet touch tracking
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
    /// Tap on a bottom-sheet item
    SheetTap { index: usize },
    /// Ask every viewer on the host to refetch now
    ResetSignal,
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected { connection_id: String },
    /// Selector contents; sent on connect and after every selection
    Options {
        active: usize,
        options: Vec<CategoryOption>,
        views: Vec<SelectorView>,
    },
    /// A freshly rendered chart
    Chart {
        index: usize,
        category_number: u32,
        title: String,
        svg: String,
        animated: bool,
        points: Vec<ChartDataPoint>,
        axis_max: u64,
    },
    Tooltip { tooltip: Tooltip },
    TooltipHidden,
    /// Whether bottom-sheet taps are currently suppressed
    Sheet { scrolling: bool },
    /// Votes were reset somewhere; a refetch is on its way
    Reset { issued_at: DateTime<Utc> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
}

impl ServerMessage {
    pub fn chart(chart: &RenderedChart) -> Self {
        ServerMessage::Chart {
            index: chart.index,
            category_number: chart.category_number,
            title: chart.title.clone(),
            svg: chart.svg.clone(),
            animated: chart.is_animated(),
            points: chart.points.clone(),
            axis_max: chart.axis_max,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// JSON text frame payload
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialize_select() {
        let json = r#"{"type": "select", "index": 2}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, ClientMessage::Select { index: 2 });
    }

    #[test]
    fn test_client_message_deserialize_unit_variants() {
        for (json, expected) in [
            (r#"{"type": "ping"}"#, ClientMessage::Ping),
            (r#"{"type": "pointer_leave"}"#, ClientMessage::PointerLeave),
            (r#"{"type": "reset_signal"}"#, ClientMessage::ResetSignal),
            (r#"{"type": "touch_end"}"#, ClientMessage::TouchEnd),
        ] {
            let msg: ClientMessage = serde_json::from_str(json).unwrap();
            assert_eq!(msg, expected);
        }
    }

    #[test]
    fn test_client_message_deserialize_touch() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "touch_move", "y": 132.5}"#).unwrap();
        assert_eq!(msg, ClientMessage::TouchMove { y: 132.5 });
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "subscribe"}"#).is_err());
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }

    #[test]
    fn test_server_message_serialize_sheet() {
        let json = ServerMessage::Sheet { scrolling: true }.to_json().unwrap();
        assert_eq!(json, r#"{"type":"sheet","scrolling":true}"#);
    }

    #[test]
    fn test_server_message_serialize_tooltip_hidden() {
        let json = ServerMessage::TooltipHidden.to_json().unwrap();
        assert_eq!(json, r#"{"type":"tooltip_hidden"}"#);
    }
}
