//! Concrete transports implementing the domain `DuplexStream` seam.
//!
//! - `websocket`: axum WebSocket, one JSON text frame per message
//! - `channel`: in-memory tokio channels, for tests and embedding

pub mod channel;
pub mod websocket;

pub use channel::{ChannelPeer, ChannelSink, ChannelSource, ChannelStream};
pub use websocket::{WebSocketSink, WebSocketSource, WebSocketStream};
