// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket stream of one request's conversation.
//!
//! Client -> Server (JSON):
//! ```json
//! {"content": "Bonjour"}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "history", "messages": [...]}
//! {"type": "message", "message": {...}}
//! {"type": "error", "error": "...", "code": "validation"}
//! ```

use axum::{
    Extension,
    extract::{
        Path, Query, State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use concierge_core::{Actor, ConciergeError, Message};
use concierge_desk::ConversationView;

use crate::error::ApiError;
use crate::handlers::{SideQuery, default_side};
use crate::server::GatewayState;

/// WebSocket message from client.
#[derive(Debug, Deserialize)]
struct LiveIncoming {
    content: String,
}

/// WebSocket message to client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LiveFrame<'a> {
    History { messages: &'a [Message] },
    Message { message: &'a Message },
    Error { error: &'a str, code: &'a str },
}

impl LiveFrame<'_> {
    fn to_ws(&self) -> Option<WsMessage> {
        match serde_json::to_string(self) {
            Ok(json) => Some(WsMessage::Text(json.into())),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode live frame");
                None
            }
        }
    }
}

/// GET /v1/requests/{id}/live
///
/// The conversation is opened before the upgrade so a hidden or missing
/// request is refused with a normal HTTP error.
pub async fn live_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Query(query): Query<SideQuery>,
) -> Result<Response, ApiError> {
    let side = query.side.unwrap_or_else(|| default_side(&actor));
    let view = ConversationView::open(&state.desk, &actor, &id, side).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, view)))
}

/// Pump notifications out and client sends in until either side closes.
async fn handle_socket(socket: WebSocket, mut view: ConversationView) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let request_id = view.request_id().to_string();

    let history = LiveFrame::History {
        messages: view.messages(),
    };
    if let Some(frame) = history.to_ws()
        && ws_sender.send(frame).await.is_err()
    {
        return;
    }

    let mut live = view.is_live();
    loop {
        let outgoing = tokio::select! {
            update = view.next_update(), if live => match update {
                Some(message) => LiveFrame::Message { message: &message }.to_ws(),
                None => {
                    live = false;
                    None
                }
            },
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => reply_to(&mut view, &text).await,
                Some(Ok(WsMessage::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => None, // Ignore binary, ping (handled by tungstenite layer)
            },
        };

        if let Some(frame) = outgoing
            && ws_sender.send(frame).await.is_err()
        {
            break;
        }
    }

    tracing::debug!(request_id, "live socket closed");
    view.close();
}

async fn reply_to(view: &mut ConversationView, text: &str) -> Option<WsMessage> {
    let incoming: LiveIncoming = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("invalid WebSocket message: {e}");
            let err = ConciergeError::Validation(e.to_string());
            return error_frame(&err);
        }
    };
    match view.send(&incoming.content).await {
        Ok(message) => LiveFrame::Message { message: &message }.to_ws(),
        Err(e) => error_frame(&e),
    }
}

fn error_frame(e: &ConciergeError) -> Option<WsMessage> {
    LiveFrame::Error {
        error: e.user_message(),
        code: e.kind(),
    }
    .to_ws()
}
