//! UseCase: セッションの開始
//!
//! トランスポート層が新しい双方向ストリームを受け付けるたびに呼び出します。
//! レジストリとブロードキャスターはサーバーインスタンスごとに 1 つで、
//! 全てのセッションに注入されます。

use std::sync::Arc;

use crate::{
    domain::{DuplexStream, SessionError},
    infrastructure::ConnectionRegistry,
};

use super::{
    broadcast::{BroadcastConfig, Broadcaster},
    session::StreamSession,
};

/// セッション開始のユースケース
pub struct OpenSessionUseCase {
    registry: Arc<ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
}

impl OpenSessionUseCase {
    /// 新しい OpenSessionUseCase を作成
    ///
    /// # Arguments
    ///
    /// * `registry` - 全セッションで共有する接続レジストリ
    /// * `config` - 配送ポリシーとエコーの有無
    pub fn new(registry: Arc<ConnectionRegistry>, config: BroadcastConfig) -> Self {
        let broadcaster = Arc::new(Broadcaster::new(registry.clone(), config));
        Self {
            registry,
            broadcaster,
        }
    }

    /// セッションを実行し、終了結果を返す
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 入力終端による正常終了
    /// * `Err(SessionError)` - 最初に観測されたエラー
    pub async fn execute<S: DuplexStream>(&self, stream: S) -> Result<(), SessionError> {
        let mut session = StreamSession::new(self.registry.clone(), self.broadcaster.clone());
        tracing::info!("opening session '{}'", session.id());
        session.run(stream).await
    }

    /// 現在接続中のセッション数
    pub async fn connection_count(&self) -> usize {
        self.registry.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Message, infrastructure::transport::ChannelStream};
    use chrono::Utc;

    #[tokio::test]
    async fn test_execute_shares_registry_between_sessions() {
        // テスト項目: 複数のセッションが同じレジストリに登録され、終了後に削除される
        // given (前提条件):
        let usecase = Arc::new(OpenSessionUseCase::new(
            Arc::new(ConnectionRegistry::new()),
            BroadcastConfig::default(),
        ));
        let (stream_a, mut peer_a) = ChannelStream::pair();
        let (stream_b, mut peer_b) = ChannelStream::pair();

        // when (操作):
        let task_a = {
            let usecase = usecase.clone();
            tokio::spawn(async move { usecase.execute(stream_a).await })
        };
        let task_b = {
            let usecase = usecase.clone();
            tokio::spawn(async move { usecase.execute(stream_b).await })
        };
        while usecase.connection_count().await < 2 {
            tokio::task::yield_now().await;
        }
        let message = Message::new("alice", "hi", Utc::now());
        peer_a.send(message.clone());

        // then (期待する結果):
        assert_eq!(peer_a.recv().await, Some(message.clone()));
        assert_eq!(peer_b.recv().await, Some(message));
        peer_a.close();
        peer_b.close();
        assert_eq!(task_a.await.unwrap(), Ok(()));
        assert_eq!(task_b.await.unwrap(), Ok(()));
        assert_eq!(usecase.connection_count().await, 0);
    }
}
