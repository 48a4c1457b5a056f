// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket endpoint for the browser terminal.
//!
//! The socket is write-only from the server's point of view: the send half
//! becomes the session's viewer, and the receive half is only read to notice
//! when the browser goes away.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::terminal::sink::ViewerFuture;
use crate::terminal::Viewer;
use crate::transport::state::AppState;

/// Send half of an upgraded socket.
pub struct WsViewer {
    tx: SplitSink<WebSocket, Message>,
}

impl WsViewer {
    pub fn new(tx: SplitSink<WebSocket, Message>) -> Self {
        Self { tx }
    }
}

impl Viewer for WsViewer {
    fn send_text(&mut self, text: String) -> ViewerFuture<'_> {
        Box::pin(async move { Ok(self.tx.send(Message::Text(text.into())).await?) })
    }

    fn close(&mut self) -> ViewerFuture<'_> {
        Box::pin(async move {
            let _ = self.tx.send(Message::Close(None)).await;
            Ok(self.tx.close().await?)
        })
    }
}

/// `GET /ws`
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    info!("websocket connection requested");
    ws.on_upgrade(move |socket| handle_connection(state, socket))
}

/// Register the socket as the viewer, then watch it until it closes.
async fn handle_connection(state: Arc<AppState>, socket: WebSocket) {
    let (ws_tx, mut ws_rx) = socket.split();
    let viewer = state.session.viewer();
    let id = viewer.set_connection(Box::new(WsViewer::new(ws_tx))).await;
    info!(viewer = %id, "websocket connection established");

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(viewer = %id, "websocket closed unexpectedly: {e}");
                break;
            }
        }
    }

    if viewer.detach(id) {
        info!(viewer = %id, "websocket connection closed");
    } else {
        debug!(viewer = %id, "replaced websocket connection closed");
    }
}
