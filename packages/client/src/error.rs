//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not establish the WebSocket connection
    #[error("failed to dial {url}: {reason}")]
    Dial { url: String, reason: String },

    /// The connection broke while the session was running
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}
