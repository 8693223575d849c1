//! WebSocket broadcast server: the transport glue around the session core.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
