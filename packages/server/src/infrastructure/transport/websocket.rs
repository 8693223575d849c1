//! WebSocket transport
//!
//! ## 責務
//!
//! - axum の `WebSocket` を `DuplexStream` として扱えるようにする
//! - テキストフレーム 1 つ = JSON エンコードされた `Message` 1 つ
//!
//! Close フレームとストリーム終端は入力終端として扱い、
//! ping / pong / binary フレームは読み飛ばします。

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{DuplexStream, Message, MessageSink, MessageSource, TransportError};

/// An upgraded WebSocket connection
pub struct WebSocketStream {
    socket: WebSocket,
}

impl WebSocketStream {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl DuplexStream for WebSocketStream {
    type Source = WebSocketSource;
    type Sink = WebSocketSink;

    fn split(self) -> (WebSocketSource, WebSocketSink) {
        let (sink, stream) = self.socket.split();
        (
            WebSocketSource { inner: stream },
            WebSocketSink { inner: sink },
        )
    }
}

pub struct WebSocketSource {
    inner: SplitStream<WebSocket>,
}

pub struct WebSocketSink {
    inner: SplitSink<WebSocket, WsMessage>,
}

#[async_trait]
impl MessageSource for WebSocketSource {
    async fn receive(&mut self) -> Result<Option<Message>, TransportError> {
        while let Some(frame) = self.inner.next().await {
            let frame = frame.map_err(|e| TransportError::Io(e.to_string()))?;
            match frame {
                WsMessage::Text(text) => {
                    return Message::from_json(text.as_str())
                        .map(Some)
                        .map_err(|e| TransportError::Decode(e.to_string()));
                }
                WsMessage::Close(_) => {
                    tracing::debug!("received close frame");
                    return Ok(None);
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) => {
                    // answered by axum itself
                }
                WsMessage::Binary(data) => {
                    tracing::warn!("ignoring binary frame ({} bytes)", data.len());
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl MessageSink for WebSocketSink {
    async fn send(&mut self, message: Message) -> Result<(), TransportError> {
        let json = message
            .to_json()
            .map_err(|e| TransportError::Encode(e.to_string()))?;
        self.inner
            .send(WsMessage::Text(json.into()))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}
