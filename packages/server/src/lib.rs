//! Broadcast chat server library.
//!
//! Every message a connected peer sends is delivered to every currently
//! connected peer. The core is transport agnostic:
//!
//! - `infrastructure::ConnectionRegistry` tracks live connections
//! - `usecase::Broadcaster` fans one message out to all of them
//! - `usecase::StreamSession` runs one connection's receive and send loops
//!
//! `ui` wires the core to an axum WebSocket endpoint.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
