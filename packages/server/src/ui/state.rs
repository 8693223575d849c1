//! Server state shared by the axum handlers.

use std::sync::Arc;

use crate::usecase::OpenSessionUseCase;

/// Shared application state
pub struct AppState {
    /// OpenSessionUseCase（セッション開始のユースケース）
    pub open_session_usecase: Arc<OpenSessionUseCase>,
}
