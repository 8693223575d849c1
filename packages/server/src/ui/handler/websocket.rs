//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};

use crate::{infrastructure::transport::WebSocketStream, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one session over an upgraded socket.
///
/// The session's terminal outcome is only logged: the peer is gone either way.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let stream = WebSocketStream::new(socket);
    match state.open_session_usecase.execute(stream).await {
        Ok(()) => tracing::debug!("WebSocket stream closed"),
        Err(e) => tracing::error!("WebSocket stream failed: {}", e),
    }
}
