//! Streaming socket: `GET /ws?token=...`.
//!
//! Browsers cannot set an `Authorization` header on a WebSocket handshake,
//! so the token rides in the query string and is validated before the
//! upgrade.  Any valid session may stream; input still goes through the REST
//! endpoints and their own gating.
//!
//! After the upgrade the connection registers an unbounded sender with the
//! hub and splits into two halves: a forward task draining the hub's channel
//! into the socket, and a read loop feeding inbound text frames to the hub.
//! Whichever half finishes first tears the other down, and the connection is
//! deregistered exactly once on the way out.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use rdesk_core::domain::access::AccessLevel;

use crate::error::ApiError;
use crate::infrastructure::http::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    token: String,
}

/// Validates the token, then upgrades.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    if query.token.is_empty() {
        return Err(ApiError::InvalidToken);
    }
    let session = state.gate.validate(&query.token)?;
    if !session.allows(AccessLevel::ViewOnly) {
        return Err(ApiError::Forbidden("view access required".to_string()));
    }
    info!(username = %session.username, "stream socket accepted");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let connection_id = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.hub.add_connection(connection_id, tx);

    let mut forward = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => state.hub.handle_message(connection_id, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(connection = %connection_id, "socket read error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
            _ = &mut forward => break,
        }
    }

    forward.abort();
    state.hub.remove_connection(connection_id);
}
