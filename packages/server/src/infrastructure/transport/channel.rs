//! In-memory duplex stream built on unbounded tokio channels.
//!
//! `ChannelStream::pair()` returns the server end (handed to a session) and a
//! `ChannelPeer` that plays the remote client: it feeds inbound messages,
//! injects read failures, signals end of input and collects what the session
//! writes back.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{DuplexStream, Message, MessageSink, MessageSource, TransportError};

type Inbound = Result<Message, TransportError>;

/// Server end of an in-memory duplex stream
pub struct ChannelStream {
    source: ChannelSource,
    sink: ChannelSink,
}

pub struct ChannelSource {
    inbound: mpsc::UnboundedReceiver<Inbound>,
}

pub struct ChannelSink {
    outbound: mpsc::UnboundedSender<Message>,
}

/// Remote end of an in-memory duplex stream
pub struct ChannelPeer {
    inbound: Option<mpsc::UnboundedSender<Inbound>>,
    outbound: mpsc::UnboundedReceiver<Message>,
}

impl ChannelStream {
    pub fn pair() -> (ChannelStream, ChannelPeer) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        (
            ChannelStream {
                source: ChannelSource {
                    inbound: inbound_rx,
                },
                sink: ChannelSink {
                    outbound: outbound_tx,
                },
            },
            ChannelPeer {
                inbound: Some(inbound_tx),
                outbound: outbound_rx,
            },
        )
    }
}

impl DuplexStream for ChannelStream {
    type Source = ChannelSource;
    type Sink = ChannelSink;

    fn split(self) -> (ChannelSource, ChannelSink) {
        (self.source, self.sink)
    }
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn receive(&mut self) -> Result<Option<Message>, TransportError> {
        match self.inbound.recv().await {
            Some(Ok(message)) => Ok(Some(message)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send(&mut self, message: Message) -> Result<(), TransportError> {
        self.outbound
            .send(message)
            .map_err(|_| TransportError::Closed)
    }
}

impl ChannelPeer {
    /// Deliver a message to the session's receive loop.
    ///
    /// Returns `false` once the session stopped reading.
    pub fn send(&self, message: Message) -> bool {
        self.push(Ok(message))
    }

    /// Make the session's next read fail with `error`
    pub fn fail(&self, error: TransportError) -> bool {
        self.push(Err(error))
    }

    /// Signal clean end of input
    pub fn close(&mut self) {
        self.inbound.take();
    }

    /// Stop accepting outbound messages; the session's next write fails
    pub fn close_outbound(&mut self) {
        self.outbound.close();
    }

    /// Wait for the next message the session wrote
    pub async fn recv(&mut self) -> Option<Message> {
        self.outbound.recv().await
    }

    /// Non-blocking variant of [`ChannelPeer::recv`]
    pub fn try_recv(&mut self) -> Option<Message> {
        self.outbound.try_recv().ok()
    }

    fn push(&self, item: Inbound) -> bool {
        match &self.inbound {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        }
    }
}
