//! Stream session: lifecycle of one connected peer.
//!
//! ```text
//! Created -> Registered -> Streaming -> Draining -> Closed
//! ```
//!
//! While streaming, a receive loop and a send loop run as child tasks under
//! one cancellation token. The first terminal signal from either loop (or a
//! delivery timeout reported by the broadcaster) ends the session: the token
//! is cancelled, both loops are joined, and the registry entry is removed.

use std::sync::Arc;

use hiroba_shared::time::to_rfc3339_micros;
use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ConnectionId, DuplexStream, Message, MessageSink, MessageSource, SessionError},
    infrastructure::{ConnectionRegistry, OUTBOUND_CAPACITY, OutboundPath},
};

use super::broadcast::Broadcaster;

type Outcome = Result<(), SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Registered,
    Streaming,
    Draining,
    Closed,
}

pub struct StreamSession {
    id: ConnectionId,
    state: watch::Sender<SessionState>,
    registry: Arc<ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
}

impl StreamSession {
    pub fn new(registry: Arc<ConnectionRegistry>, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            id: ConnectionId::generate(),
            state: watch::Sender::new(SessionState::Created),
            registry,
            broadcaster,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Follow state changes while `run` is in progress
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Drive `stream` until either side terminates.
    ///
    /// Returns `Ok(())` on clean end of input, the first observed error
    /// otherwise. The registry entry is removed on every exit path.
    pub async fn run<S: DuplexStream>(&mut self, stream: S) -> Result<(), SessionError> {
        let (messages, queue) = mpsc::channel(OUTBOUND_CAPACITY);
        // One slot: only the first terminal signal is kept, later ones are dropped.
        let (terminate, mut terminated) = mpsc::channel(1);
        let path = OutboundPath {
            messages,
            terminate,
        };

        self.registry.register(self.id, &path).await?;
        let registration = Registration {
            registry: Some(self.registry.clone()),
            id: self.id,
        };
        self.transition(SessionState::Registered);

        let (source, sink) = stream.split();
        let cancel = CancellationToken::new();
        let mut loops = JoinSet::new();
        loops.spawn(receive_loop(
            source,
            self.id,
            self.broadcaster.clone(),
            cancel.clone(),
            path.terminate.clone(),
        ));
        loops.spawn(send_loop(
            sink,
            queue,
            cancel.clone(),
            path.terminate.clone(),
        ));
        self.transition(SessionState::Streaming);

        let outcome = tokio::select! {
            signal = terminated.recv() => signal.unwrap_or(Ok(())),
            Some(joined) = loops.join_next() => match terminated.try_recv() {
                Ok(signal) => signal,
                Err(_) => joined.map_err(|e| SessionError::Aborted(e.to_string())),
            },
        };

        self.transition(SessionState::Draining);
        cancel.cancel();
        while let Some(joined) = loops.join_next().await {
            if let Err(e) = joined {
                tracing::error!("session '{}' loop aborted: {}", self.id, e);
            }
        }

        registration.release().await;
        drop(path);
        self.transition(SessionState::Closed);

        match &outcome {
            Ok(()) => tracing::info!("session '{}' finished", self.id),
            Err(e) => tracing::warn!("session '{}' finished with error: {}", self.id, e),
        }
        outcome
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        tracing::debug!("session '{}': {:?} -> {:?}", self.id, previous, next);
    }
}

/// Registry membership of one session.
///
/// `release` unregisters in place; if the session future is dropped before
/// that, `Drop` hands the removal to the runtime.
struct Registration {
    registry: Option<Arc<ConnectionRegistry>>,
    id: ConnectionId,
}

impl Registration {
    async fn release(mut self) {
        if let Some(registry) = self.registry.take() {
            registry.unregister(&self.id).await;
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let Some(registry) = self.registry.take() else {
            return;
        };
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    registry.unregister(&id).await;
                });
            }
            Err(_) => tracing::error!("no runtime left to unregister connection '{}'", id),
        }
    }
}

/// Report a terminal signal without ever waiting on the channel
fn signal(terminate: &mpsc::Sender<Outcome>, outcome: Outcome) {
    if terminate.try_send(outcome).is_err() {
        tracing::debug!("terminal signal discarded, session already terminating");
    }
}

async fn receive_loop<R: MessageSource>(
    mut source: R,
    id: ConnectionId,
    broadcaster: Arc<Broadcaster>,
    cancel: CancellationToken,
    terminate: mpsc::Sender<Outcome>,
) {
    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => return,
            received = source.receive() => received,
        };

        match received {
            Ok(Some(message)) => {
                tracing::info!(
                    "received message on '{}': sender={}, text={}, timestamp={}",
                    id,
                    message.sender(),
                    message.text(),
                    to_rfc3339_micros(&message.timestamp())
                );
                // Next read waits for every peer to accept this one.
                broadcaster.broadcast_from(&id, &message).await;
            }
            Ok(None) => {
                tracing::info!("streaming finished on '{}'", id);
                signal(&terminate, Ok(()));
                return;
            }
            Err(e) => {
                tracing::error!("failed to receive message on '{}': {}", id, e);
                signal(&terminate, Err(SessionError::TransportRead(e)));
                return;
            }
        }
    }
}

async fn send_loop<W: MessageSink>(
    mut sink: W,
    mut queue: mpsc::Receiver<Message>,
    cancel: CancellationToken,
    terminate: mpsc::Sender<Outcome>,
) {
    loop {
        let message = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            message = queue.recv() => match message {
                Some(message) => message,
                None => return,
            },
        };

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = sink.send(message) => sent,
        };

        if let Err(e) = sent {
            tracing::error!("failed to send message: {}", e);
            signal(&terminate, Err(SessionError::TransportWrite(e)));
            return;
        }
    }
}
