//! Connection registry
//!
//! ## 責務
//!
//! - 接続中のセッションと、その送信キュー（OutboundPath）の対応を管理
//! - ブロードキャスト用のスナップショットを一貫した状態で提供
//!
//! ## 設計ノート
//!
//! レジストリはキューを所有しません。送信キューの受信側と強参照の sender は
//! セッションが保持し、レジストリには `WeakSender` だけを登録します。
//! セッションが終了して sender を破棄すると、スナップショットからも自然に外れます。
//!
//! 登録・削除・スナップショットはすべて同じ `Mutex` の下で行われます。

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};

use crate::domain::{ConnectionId, Message, RegistryError, SessionError};

/// Capacity of every outbound queue.
///
/// A single slot: a peer that is not draining makes the next enqueue wait.
pub const OUTBOUND_CAPACITY: usize = 1;

/// Outbound side of one session, owned by that session.
///
/// `messages` is the capacity-1 queue drained by the session's send loop.
/// `terminate` lets the broadcaster end a stalled session.
pub struct OutboundPath {
    pub messages: mpsc::Sender<Message>,
    pub terminate: mpsc::Sender<Result<(), SessionError>>,
}

/// Non-owning registry entry
struct Entry {
    messages: mpsc::WeakSender<Message>,
    terminate: mpsc::WeakSender<Result<(), SessionError>>,
}

/// A registered peer as seen by one snapshot
#[derive(Clone)]
pub struct Peer {
    pub id: ConnectionId,
    pub messages: mpsc::Sender<Message>,
    pub terminate: mpsc::Sender<Result<(), SessionError>>,
}

/// Map of live connections to their outbound paths
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: Mutex<HashMap<ConnectionId, Entry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection.
    ///
    /// Fails only when `id` is already present.
    pub async fn register(&self, id: ConnectionId, path: &OutboundPath) -> Result<(), RegistryError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&id) {
            return Err(RegistryError::DuplicateConnection(id));
        }
        entries.insert(
            id,
            Entry {
                messages: path.messages.downgrade(),
                terminate: path.terminate.downgrade(),
            },
        );
        tracing::info!("adding new channel: id={}, connections={}", id, entries.len());
        Ok(())
    }

    /// Remove a connection. Returns `false` when it was not registered.
    pub async fn unregister(&self, id: &ConnectionId) -> bool {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(id).is_some();
        if removed {
            tracing::info!("removing a channel: id={}, connections={}", id, entries.len());
        }
        removed
    }

    /// Consistent copy of the registered peers at the instant of the call.
    ///
    /// Entries whose owning session already dropped its sender are skipped.
    pub async fn snapshot(&self) -> Vec<Peer> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter_map(|(id, entry)| {
                Some(Peer {
                    id: *id,
                    messages: entry.messages.upgrade()?,
                    terminate: entry.terminate.upgrade()?,
                })
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.entries.lock().await.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - register / unregister / snapshot の基本動作
    // - 重複登録のエラー、未登録 ID の削除が no-op であること
    // - 並行して登録・削除してもレジストリが壊れないこと
    //
    // 【なぜこのテストが必要か】
    // - レジストリはセッション間で共有される唯一の状態
    // - ブロードキャストの配送先はスナップショットで決まる
    // ========================================

    fn create_path() -> (
        OutboundPath,
        mpsc::Receiver<Message>,
        mpsc::Receiver<Result<(), SessionError>>,
    ) {
        let (messages, messages_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (terminate, terminate_rx) = mpsc::channel(1);
        (
            OutboundPath {
                messages,
                terminate,
            },
            messages_rx,
            terminate_rx,
        )
    }

    #[tokio::test]
    async fn test_register_and_snapshot() {
        // テスト項目: 登録した接続がスナップショットに含まれる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (path, _rx, _term_rx) = create_path();
        let id = ConnectionId::generate();

        // when (操作):
        registry.register(id, &path).await.unwrap();
        let snapshot = registry.snapshot().await;

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert!(registry.contains(&id).await);
    }

    #[tokio::test]
    async fn test_register_duplicate_id_fails() {
        // テスト項目: 同じ ID の二重登録はエラーになる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (path, _rx, _term_rx) = create_path();
        let id = ConnectionId::generate();
        registry.register(id, &path).await.unwrap();

        // when (操作):
        let result = registry.register(id, &path).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::DuplicateConnection(id)));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // テスト項目: 削除は冪等で、未登録 ID の削除は何もしない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (path, _rx, _term_rx) = create_path();
        let id = ConnectionId::generate();
        registry.register(id, &path).await.unwrap();

        // when (操作):
        let first = registry.unregister(&id).await;
        let second = registry.unregister(&id).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_skips_dropped_paths() {
        // テスト項目: セッションが sender を破棄したエントリはスナップショットに含まれない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (path, _rx, _term_rx) = create_path();
        let id = ConnectionId::generate();
        registry.register(id, &path).await.unwrap();

        // when (操作):
        drop(path);
        let snapshot = registry.snapshot().await;

        // then (期待する結果):
        assert!(snapshot.is_empty());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_not_affected_by_later_unregister() {
        // テスト項目: スナップショット取得後の削除はそのスナップショットに影響しない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (path, _rx, _term_rx) = create_path();
        let id = ConnectionId::generate();
        registry.register(id, &path).await.unwrap();

        // when (操作):
        let snapshot = registry.snapshot().await;
        registry.unregister(&id).await;

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_unregister() {
        // テスト項目: 並行して登録・削除してもパニックせず、最終的に空になる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());

        // when (操作):
        let mut handles = Vec::new();
        for _ in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (path, _rx, _term_rx) = create_path();
                let id = ConnectionId::generate();
                registry.register(id, &path).await.unwrap();
                let _ = registry.snapshot().await;
                assert!(registry.unregister(&id).await);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        assert!(registry.is_empty().await);
    }
}
