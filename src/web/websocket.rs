//! WebSocket transport for observers.
//!
//! Observers only receive. Anything they send is logged and ignored.

use crate::web::lifecycle::ObserverSession;
use crate::web::router::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};

/// WebSocket upgrade handler.
///
/// The observer is admitted, and the resync requested, before the upgrade
/// completes. Connections beyond the observer limit get 503.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    match state.lifecycle.on_connect() {
        Ok(session) => ws.on_upgrade(move |socket| handle_websocket(socket, session)),
        Err(e) => {
            warn!("Rejecting observer: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}

/// Pump messages to one observer until either side closes.
async fn handle_websocket(socket: WebSocket, mut session: ObserverSession) {
    let id = session.id();
    let (mut sender, mut receiver) = socket.split();

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    debug!("Ignoring message from observer {}: {}", id, text);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket error for observer {}: {}", id, e);
                    break;
                }
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = session.next_message().await {
            if let Err(e) = sender.send(Message::Text(message.payload.clone())).await {
                warn!("Failed to send update to observer {}: {}", session.id(), e);
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => {
            debug!("Receive side closed for observer {}", id);
            send_task.abort();
        }
        _ = &mut send_task => {
            debug!("Send side closed for observer {}", id);
            recv_task.abort();
        }
    }
}
