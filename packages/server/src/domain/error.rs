//! Error types for the broadcast core.

use std::time::Duration;

use thiserror::Error;

use super::ConnectionId;

/// Failures reported by a transport implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The underlying connection is already closed
    #[error("transport closed")]
    Closed,

    /// I/O or protocol level failure
    #[error("transport I/O error: {0}")]
    Io(String),

    /// An inbound frame could not be decoded into a message
    #[error("failed to decode inbound frame: {0}")]
    Decode(String),

    /// An outbound message could not be encoded
    #[error("failed to encode outbound message: {0}")]
    Encode(String),
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The connection id is already registered
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),
}

/// Terminal outcome of a failed stream session.
///
/// End of input is not an error; a session that ends that way returns `Ok(())`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("failed to receive message: {0}")]
    TransportRead(#[source] TransportError),

    #[error("failed to send message: {0}")]
    TransportWrite(#[source] TransportError),

    /// The peer did not drain its outbound queue within the delivery timeout
    #[error("outbound delivery stalled for more than {timeout:?}")]
    DeliveryTimeout { timeout: Duration },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A session loop panicked or was aborted
    #[error("session task aborted: {0}")]
    Aborted(String),
}
