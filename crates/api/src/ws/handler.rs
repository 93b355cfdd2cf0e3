use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to a route-alert subscription.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage one alert subscriber after the upgrade.
///
/// The stream is one-way: the server pushes alert frames and heartbeat
/// pings, the client only answers with protocol frames. A spawned sender
/// task drains the manager channel into the socket sink while this task
/// watches the inbound side for the close.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "Alert subscriber connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "Subscriber sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Heartbeat pong");
            }
            Ok(Message::Ping(_)) => {
                // The protocol layer answers pings for us.
            }
            Ok(_) => {
                // Alert delivery is push-only. Payload frames from the
                // client carry no meaning here, so they are dropped.
                tracing::debug!(conn_id = %conn_id, "Ignoring inbound frame on alert stream");
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "Subscriber receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Alert subscriber disconnected");
}
