//! Broadcast fan-out
//!
//! ## 概要
//!
//! 1 つのメッセージを、レジストリのスナップショットに含まれる全ての送信キューへ
//! 並行に配送します。ピアごとに 1 タスクを起動し、全ての配送が終わるまで待ちます
//! （同期バリア）。
//!
//! ## 配送ポリシー
//!
//! - `Blocking`: タイムアウトなし。キューを読まないピアが 1 つでもあると
//!   ブロードキャスト全体がそこで止まります（既定値）。
//! - `Bounded`: ピアごとの配送にタイムアウトを設定。期限切れのピアだけを
//!   `SessionError::DeliveryTimeout` で終了させ、他のピアには影響しません。

use std::{sync::Arc, time::Duration};

use tokio::task::JoinSet;

use crate::{
    domain::{ConnectionId, Message, SessionError},
    infrastructure::{ConnectionRegistry, Peer},
};

/// How a single per-peer enqueue is bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Wait for the peer's queue for as long as it takes
    #[default]
    Blocking,
    /// Give up on a peer after `timeout` and terminate that peer's session
    Bounded { timeout: Duration },
}

/// Whether the sending connection gets its own message back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanoutMode {
    #[default]
    IncludeSender,
    ExcludeSender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastConfig {
    pub policy: DeliveryPolicy,
    pub fanout: FanoutMode,
}

/// Per-broadcast delivery counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    /// Enqueued into the peer's outbound queue
    pub delivered: usize,
    /// The peer was already unwinding and its queue was gone
    pub closed: usize,
    /// Gave up under `DeliveryPolicy::Bounded`
    pub timed_out: usize,
}

impl BroadcastReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.closed + self.timed_out
    }

    fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Closed => self.closed += 1,
            DeliveryOutcome::TimedOut => self.timed_out += 1,
        }
    }
}

enum DeliveryOutcome {
    Delivered,
    Closed,
    TimedOut,
}

/// Fans messages out to every registered connection
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    config: BroadcastConfig,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>, config: BroadcastConfig) -> Self {
        Self { registry, config }
    }

    /// Deliver `message` to every connection in the current snapshot.
    ///
    /// Returns once every delivery attempt has finished.
    pub async fn broadcast(&self, message: &Message) -> BroadcastReport {
        self.fan_out(None, message).await
    }

    /// Deliver a message received from `origin`, honoring the fan-out mode
    pub async fn broadcast_from(&self, origin: &ConnectionId, message: &Message) -> BroadcastReport {
        let exclude = match self.config.fanout {
            FanoutMode::IncludeSender => None,
            FanoutMode::ExcludeSender => Some(*origin),
        };
        self.fan_out(exclude, message).await
    }

    async fn fan_out(&self, exclude: Option<ConnectionId>, message: &Message) -> BroadcastReport {
        let peers = self.registry.snapshot().await;

        let mut deliveries = JoinSet::new();
        for peer in peers.into_iter().filter(|peer| Some(peer.id) != exclude) {
            deliveries.spawn(deliver(peer, message.clone(), self.config.policy));
        }

        let mut report = BroadcastReport::default();
        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok(outcome) => report.record(outcome),
                Err(e) => tracing::error!("delivery task failed: {}", e),
            }
        }

        tracing::debug!(
            "broadcast from '{}' finished: delivered={}, closed={}, timed_out={}",
            message.sender(),
            report.delivered,
            report.closed,
            report.timed_out
        );
        report
    }
}

async fn deliver(peer: Peer, message: Message, policy: DeliveryPolicy) -> DeliveryOutcome {
    let Peer {
        id,
        messages,
        terminate,
    } = peer;

    let sent = match policy {
        DeliveryPolicy::Blocking => messages.send(message).await,
        DeliveryPolicy::Bounded { timeout } => {
            match tokio::time::timeout(timeout, messages.send(message)).await {
                Ok(sent) => sent,
                Err(_) => {
                    tracing::warn!("delivery to '{}' stalled for {:?}, terminating it", id, timeout);
                    // Discarded when the session already has a terminal signal.
                    let _ = terminate.try_send(Err(SessionError::DeliveryTimeout { timeout }));
                    return DeliveryOutcome::TimedOut;
                }
            }
        }
    };

    match sent {
        Ok(()) => {
            tracing::debug!("delivered message to '{}'", id);
            DeliveryOutcome::Delivered
        }
        Err(_) => {
            tracing::debug!("connection '{}' is closing, skipped", id);
            DeliveryOutcome::Closed
        }
    }
}
