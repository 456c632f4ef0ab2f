// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket transport for the realtime session.
//!
//! Client -> Server (JSON):
//! ```json
//! {"event": "authenticate", "data": "<jwt>"}
//! {"event": "typing", "data": {"userId": 8}}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"event": "authenticated", "data": {"userId": 7, "userName": "Alice"}}
//! {"event": "user_typing", "data": {"senderId": 7}}
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::registry::ConnectionHandle;
use crate::server::AppState;
use crate::session::Session;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one connection until the client goes away.
///
/// A writer task drains the session's outbound queue into the socket while
/// this task feeds inbound text frames to the state machine.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (handle, mut rx) = ConnectionHandle::channel();
    let mut session = Session::open(handle, state.session_context());
    let connection = session.connection_id();

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match event.to_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(connection = %connection, "failed to encode event: {e}");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => session.handle_text(text.as_str()).await,
            Message::Close(_) => break,
            _ => {} // Binary is not part of the protocol; pings are answered by the transport.
        }
    }

    session.close();
    writer.abort();
}
