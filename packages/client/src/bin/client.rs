//! Broadcast chat client.
//!
//! Connects to a Hiroba server and sends every line typed at the prompt.
//! All broadcast messages, including this client's own echoes, are printed.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client
//! cargo run --bin hiroba-client -- --username alice --url ws://127.0.0.1:50051/ws
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_client::run_client_session;
use hiroba_shared::{
    logger::setup_logger,
    time::{SystemClock, unix_seconds},
};

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "WebSocket chat client for a Hiroba broadcast server", long_about = None)]
struct Args {
    /// Name attached to every message; defaults to the current Unix time
    #[arg(short = 'n', long)]
    username: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:50051/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let username = args
        .username
        .unwrap_or_else(|| unix_seconds().to_string());

    if let Err(e) = run_client_session(&args.url, &username, Arc::new(SystemClock)).await {
        tracing::error!("failed to run client: {}", e);
        std::process::exit(1);
    }
}
