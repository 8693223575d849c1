//! CLI client for the Hiroba broadcast chat server.
//!
//! Reads lines from the terminal, sends each as a chat message, and prints
//! every message the server broadcasts back.

pub mod error;
pub mod formatter;
pub mod session;
mod ui;

pub use session::run_client_session;
