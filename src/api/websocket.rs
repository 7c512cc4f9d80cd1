//! WebSocket handler for the realtime viewer channel
//!
//! Viewers connect here to hear that a machine's data changed; the data
//! itself always travels over the REST API. The channel carries no
//! credential, matching the rest of the wire contract.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use tracing::{debug, info};

use crate::{
    api::state::ApiState,
    notifier::{ViewerEvent, ViewerRequest},
};

/// WebSocket upgrade handler
///
/// GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle one viewer connection for its lifetime
async fn handle_websocket(socket: WebSocket, state: ApiState) {
    let (viewer_id, mut event_rx) = state.notifier.register().await;
    info!("viewer {viewer_id} connected");

    let (mut sender, mut receiver) = socket.split();

    // Drain registry events into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };

            if sender.send(Message::Text(text)).await.is_err() {
                debug!("viewer send failed, client disconnected");
                break;
            }
        }
    });

    // Handle inbound viewer requests
    let notifier = state.notifier.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ViewerRequest>(&text) {
                    Ok(ViewerRequest::RefreshRequest { server_name }) => {
                        debug!("refresh requested for {server_name}");
                        // Viewers are only told the refresh is underway; nothing
                        // reaches the agent's sampling loop from here yet.
                        notifier
                            .broadcast(ViewerEvent::RefreshStarted { server_name })
                            .await;
                    }
                    Err(e) => {
                        // Malformed input never tears down the connection
                        debug!("ignoring malformed viewer message: {e}");
                    }
                },
                Message::Close(_) => break,
                Message::Ping(_) => {
                    // Pong is automatically sent by axum
                }
                _ => {}
            }
        }
    });

    // Either side ending tears down the other
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    state.notifier.unregister(viewer_id).await;
    info!("viewer {viewer_id} disconnected");
}
