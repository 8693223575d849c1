//! HTTP handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::ui::state::AppState;

/// Health check endpoint
///
/// Reports the number of currently registered connections.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let connections = state.open_session_usecase.connection_count().await;
    Json(serde_json::json!({"status": "ok", "connections": connections}))
}
