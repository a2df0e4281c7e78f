//! WebSocket Handler
//!
//! Each connection gets its own chart instance: independent axis, data,
//! animate-once bookkeeping and poller. The page sends selections and
//! browser signals; the session answers with rendered charts, tooltips
//! and selector state.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;

use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::selector::ScrollGuard;
use crate::widget::{LiveChart, RenderOptions};

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match state.ws_hub.register(tx.clone()).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected WebSocket connection");
            send_direct(&mut sender, &ServerMessage::error(e.to_string())).await;
            return;
        }
    };

    let Some(chart) = state.host.spawn_instance().await else {
        tracing::warn!(connection_id = %connection_id, "No catalog, closing live view");
        send_direct(&mut sender, &ServerMessage::error("Categories not available")).await;
        state.ws_hub.unregister(&connection_id).await;
        return;
    };

    let connected = ServerMessage::Connected {
        connection_id: connection_id.clone(),
    };
    if !send_direct(&mut sender, &connected).await {
        state.ws_hub.unregister(&connection_id).await;
        return;
    }

    let conn_id_for_send = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg.to_json() {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            connection_id = %conn_id_for_send,
                            "WebSocket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                }
            }
        }
    });

    let mut session = Session::new(&state, chart, tx);
    let forward_task = session.forward_renders();
    session.start().await;

    loop {
        let deadline = session.sheet_deadline();
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(msg)) => {
                    if !session.handle_ws_message(msg).await {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket receive error");
                    break;
                }
                None => break,
            },
            _ = sleep_until(deadline) => session.settle_sheet(),
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    forward_task.abort();
    state.ws_hub.unregister(&connection_id).await;
}

/// Serialize and send outside the send task; false when the socket is gone
async fn send_direct<S>(sender: &mut S, message: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    match message.to_json() {
        Ok(text) => sender.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            false
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

/// One viewer's chart and gesture state
pub(crate) struct Session {
    chart: LiveChart,
    guard: ScrollGuard,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl Session {
    pub(crate) fn new(
        state: &AppState,
        chart: LiveChart,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        let guard = ScrollGuard::new(state.config.selector);
        Self {
            chart,
            guard,
            tx,
        }
    }

    fn send(&self, message: ServerMessage) {
        // Receiver gone means the connection is closing
        let _ = self.tx.send(message);
    }

    /// Push every render of this session's chart to the client
    pub(crate) fn forward_renders(&self) -> JoinHandle<()> {
        let mut renders = self.chart.subscribe();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            loop {
                match renders.recv().await {
                    Ok(chart) => {
                        if tx.send(ServerMessage::chart(&chart)).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "Live view skipped renders");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Initial selector state and first category
    pub(crate) async fn start(&self) {
        self.select(0).await;
    }

    async fn send_options(&self) {
        self.send(ServerMessage::Options {
            active: self.chart.active().await,
            options: self.chart.build_options().await,
            views: self.chart.selector_views().await,
        });
    }

    async fn select(&self, index: usize) {
        match self.chart.set_active(index).await {
            Ok(_) => self.send_options().await,
            Err(e) => self.send(ServerMessage::error(e.to_string())),
        }
    }

    fn sheet_deadline(&self) -> Option<Instant> {
        self.guard.quiet_deadline()
    }

    fn settle_sheet(&mut self) {
        if self.guard.settle(Instant::now()) {
            self.send(ServerMessage::Sheet { scrolling: false });
        }
    }

    /// Handle a received WebSocket message
    ///
    /// Returns false if the connection should be closed.
    pub(crate) async fn handle_ws_message(&mut self, message: Message) -> bool {
        match message {
            Message::Text(text) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => self.handle_client_message(client_msg).await,
                    Err(e) => {
                        tracing::debug!(error = %e, text = %text, "Invalid client message");
                        self.send(ServerMessage::error(format!(
                            "Invalid message format: {}",
                            e
                        )));
                    }
                }
                true
            }
            Message::Binary(_) => {
                self.send(ServerMessage::error("Binary messages not supported"));
                true
            }
            Message::Ping(_) | Message::Pong(_) => true,
            Message::Close(_) => {
                tracing::debug!("Client requested close");
                false
            }
        }
    }

    pub(crate) async fn handle_client_message(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::Select { index } => self.select(index).await,
            ClientMessage::Replay => {
                let active = self.chart.active().await;
                if let Err(e) = self.chart.render(active, RenderOptions::replay()).await {
                    self.send(ServerMessage::error(e.to_string()));
                }
            }
            ClientMessage::Visibility { hidden } => self.chart.set_visible(!hidden),
            ClientMessage::Hover { x, y } => match self.chart.hit_test(x, y).await {
                Some(tooltip) => self.send(ServerMessage::Tooltip { tooltip }),
                None => self.send(ServerMessage::TooltipHidden),
            },
            ClientMessage::PointerLeave => self.send(ServerMessage::TooltipHidden),
            ClientMessage::TouchStart { y } => self.guard.touch_start(y, Instant::now()),
            ClientMessage::TouchMove { y } => {
                if self.guard.touch_move(y, Instant::now()) {
                    self.send(ServerMessage::Sheet { scrolling: true });
                }
            }
            ClientMessage::TouchEnd => self.guard.touch_end(),
            ClientMessage::SheetTap { index } => {
                if self.guard.tap(index, Instant::now()) {
                    self.select(index).await;
                }
            }
            // Another tab on this page reset the votes; only this viewer refetches
            ClientMessage::ResetSignal => {
                self.chart.refresh_now().await;
            }
            ClientMessage::Ping => self.send(ServerMessage::Pong),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use std::time::Duration;

    async fn session() -> (Session, mpsc::UnboundedReceiver<ServerMessage>) {
        session_on(&*test_state().await).await
    }

    async fn session_on(state: &AppState) -> (Session, mpsc::UnboundedReceiver<ServerMessage>) {
        let chart = state.host.spawn_instance().await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(state, chart, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn test_start_sends_options() {
        let (session, mut rx) = session().await;
        session.start().await;

        let messages = drain(&mut rx);
        assert!(matches!(
            messages.as_slice(),
            [ServerMessage::Options { active: 0, options, views }]
                if options.len() == 2 && views.len() == 3
        ));
    }

    #[tokio::test]
    async fn test_select_updates_options() {
        let (mut session, mut rx) = session().await;
        session.start().await;
        drain(&mut rx);

        session
            .handle_client_message(ClientMessage::Select { index: 1 })
            .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServerMessage::Options { active: 1, .. }]
        ));

        session
            .handle_client_message(ClientMessage::Select { index: 9 })
            .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServerMessage::Error { .. }]
        ));
    }

    #[tokio::test]
    async fn test_forwarded_renders() {
        let (session, mut rx) = session().await;
        let forward = session.forward_renders();
        session.start().await;

        let mut saw_chart = false;
        while let Some(msg) = rx.recv().await {
            if let ServerMessage::Chart { index, svg, .. } = msg {
                assert_eq!(index, 0);
                assert!(svg.starts_with("<svg"));
                saw_chart = true;
                break;
            }
        }
        assert!(saw_chart);
        forward.abort();
    }

    #[tokio::test]
    async fn test_hover_and_leave() {
        let (mut session, mut rx) = session().await;
        session.start().await;
        drain(&mut rx);

        session
            .handle_client_message(ClientMessage::Hover { x: 100.0, y: 300.0 })
            .await;
        session
            .handle_client_message(ClientMessage::Hover { x: 2.0, y: 2.0 })
            .await;
        session.handle_client_message(ClientMessage::PointerLeave).await;

        let messages = drain(&mut rx);
        assert!(matches!(&messages[0], ServerMessage::Tooltip { tooltip } if tooltip.name == "Alice"));
        assert!(matches!(messages[1], ServerMessage::TooltipHidden));
        assert!(matches!(messages[2], ServerMessage::TooltipHidden));
    }

    #[tokio::test]
    async fn test_scroll_suppresses_sheet_tap() {
        let (mut session, mut rx) = session().await;
        session.start().await;
        drain(&mut rx);

        session
            .handle_client_message(ClientMessage::TouchStart { y: 10.0 })
            .await;
        session
            .handle_client_message(ClientMessage::TouchMove { y: 80.0 })
            .await;
        session.handle_client_message(ClientMessage::TouchEnd).await;
        session
            .handle_client_message(ClientMessage::SheetTap { index: 1 })
            .await;

        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServerMessage::Sheet { scrolling: true }]
        ));
        assert_eq!(session.chart.active().await, 0);
        assert!(session.sheet_deadline().is_some());
    }

    #[tokio::test]
    async fn test_plain_sheet_tap_selects() {
        let (mut session, mut rx) = session().await;
        session.start().await;
        drain(&mut rx);

        session
            .handle_client_message(ClientMessage::TouchStart { y: 10.0 })
            .await;
        session.handle_client_message(ClientMessage::TouchEnd).await;
        session
            .handle_client_message(ClientMessage::SheetTap { index: 1 })
            .await;

        assert_eq!(session.chart.active().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_text_keeps_connection() {
        let (mut session, mut rx) = session().await;

        assert!(session.handle_ws_message(Message::Text("nope".into())).await);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServerMessage::Error { .. }]
        ));
        assert!(!session.handle_ws_message(Message::Close(None)).await);
    }

    #[tokio::test]
    async fn test_ping() {
        let (mut session, mut rx) = session().await;
        session.handle_client_message(ClientMessage::Ping).await;
        assert!(matches!(drain(&mut rx).as_slice(), [ServerMessage::Pong]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_signal_refetches_only_this_viewer() {
        let state = test_state().await;
        let (mut viewer, mut viewer_rx) = session_on(&state).await;
        let (other, mut other_rx) = session_on(&state).await;
        viewer.start().await;
        other.start().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let viewer_before = viewer.chart.stats().await.successes;
        let other_before = other.chart.stats().await.successes;
        drain(&mut viewer_rx);
        drain(&mut other_rx);

        viewer.handle_client_message(ClientMessage::ResetSignal).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(viewer.chart.stats().await.successes, viewer_before + 1);
        assert_eq!(other.chart.stats().await.successes, other_before);
        assert!(!drain(&mut other_rx)
            .iter()
            .any(|m| matches!(m, ServerMessage::Reset { .. })));
    }
}
