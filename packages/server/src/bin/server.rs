//! Broadcast chat server.
//!
//! Every message received from a client is delivered to all connected clients,
//! the sender included unless `--no-echo` is given.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --delivery-timeout-ms 500
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use hiroba_server::{
    infrastructure::ConnectionRegistry,
    ui::Server,
    usecase::{BroadcastConfig, DeliveryPolicy, FanoutMode, OpenSessionUseCase},
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "WebSocket chat server broadcasting every message to all peers", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "50051")]
    port: u16,

    /// Give up on a peer that does not drain its queue within this many
    /// milliseconds and close its connection. Without it a slow peer stalls
    /// every broadcast.
    #[arg(long, value_name = "MS")]
    delivery_timeout_ms: Option<u64>,

    /// Do not echo messages back to their sender
    #[arg(long)]
    no_echo: bool,
}

impl Args {
    fn broadcast_config(&self) -> BroadcastConfig {
        BroadcastConfig {
            policy: match self.delivery_timeout_ms {
                Some(ms) => DeliveryPolicy::Bounded {
                    timeout: Duration::from_millis(ms),
                },
                None => DeliveryPolicy::Blocking,
            },
            fanout: if self.no_echo {
                FanoutMode::ExcludeSender
            } else {
                FanoutMode::IncludeSender
            },
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = args.broadcast_config();
    tracing::info!("broadcast config: {:?}", config);

    // 1. Registry shared by every session
    let registry = Arc::new(ConnectionRegistry::new());

    // 2. UseCase
    let open_session_usecase = Arc::new(OpenSessionUseCase::new(registry, config));

    // 3. Server
    let server = Server::new(open_session_usecase);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("failed to run server: {}", e);
        std::process::exit(1);
    }
}
