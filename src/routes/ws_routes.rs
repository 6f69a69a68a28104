use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::models::SessionEvent;
use crate::routes::api_routes::error_response;
use crate::service::session_service::SessionService;

/// GET `/ws/sessions/{id}` — upgrades to a WebSocket carrying the session's events.
pub async fn session_events_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(svc): State<SessionService>,
) -> Response {
    match svc.subscribe(&id) {
        Ok(rx) => ws.on_upgrade(move |socket| forward_events(socket, id, rx)),
        Err(e) => error_response(&e),
    }
}

/// Pushes every event as JSON until the client leaves or the session closes.
///
/// Protocol: server → client only, one text frame per event, tagged by `type`
/// (`message_appended`, `composing_changed`, `cleared`, `input_changed`,
/// `note_selected`, `tutoring_started`, `closed`). Client frames are ignored.
async fn forward_events(socket: WebSocket, id: String, mut rx: broadcast::Receiver<SessionEvent>) {
    info!(session_id = %id, "event subscriber connected");
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let closing = event == SessionEvent::Closed;
                    let Ok(json) = serde_json::to_string(&event) else { continue };
                    if sink.send(Message::Text(json.into())).await.is_err() || closing {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session_id = %id, skipped, "event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(session_id = %id, "WebSocket receive error: {e}");
                    break;
                }
            },
        }
    }

    let _ = sink.close().await;
    info!(session_id = %id, "event subscriber disconnected");
}
