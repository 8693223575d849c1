//! Transport seam between the session core and a concrete duplex stream.
//!
//! The core only needs two halves that can be driven from separate tasks:
//! one that yields inbound messages and one that accepts outbound messages.
//! WebSocket and in-memory channel implementations live in
//! `infrastructure::transport`.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Message, TransportError};

/// Inbound half of a duplex stream
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageSource: Send {
    /// Read the next inbound message.
    ///
    /// Returns `Ok(None)` on clean end of input.
    async fn receive(&mut self) -> Result<Option<Message>, TransportError>;
}

/// Outbound half of a duplex stream
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageSink: Send {
    /// Write one message to the peer.
    async fn send(&mut self, message: Message) -> Result<(), TransportError>;
}

/// A bidirectional message stream that can be split into independent halves
pub trait DuplexStream: Send {
    type Source: MessageSource + 'static;
    type Sink: MessageSink + 'static;

    fn split(self) -> (Self::Source, Self::Sink);
}

impl<R, W> DuplexStream for (R, W)
where
    R: MessageSource + 'static,
    W: MessageSink + 'static,
{
    type Source = R;
    type Sink = W;

    fn split(self) -> (R, W) {
        self
    }
}
