//! Domain layer: value types, error types and the transport seam.
//!
//! Nothing in here depends on a concrete transport or on tokio tasks.
//! Infrastructure implements the traits defined here.

pub mod connection_id;
pub mod error;
pub mod message;
pub mod transport;

pub use connection_id::ConnectionId;
pub use error::{RegistryError, SessionError, TransportError};
pub use message::Message;
pub use transport::{DuplexStream, MessageSink, MessageSource};
