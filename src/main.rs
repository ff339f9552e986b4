//! Clinic gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                ┌──────────────────────────────────────────────┐
//!     ───────────────────────┼─▶ request id ─▶ trace ─▶ timeout ─▶ session   │
//!                            │                                   gate       │
//!                            │                                    │         │
//!                            │        ┌───────────────┬───────────┴──────┐  │
//!                            │        ▼               ▼                  ▼  │
//!                            │   /api/* proxy   /documents/consent   static │
//!                            │        │          (PDF render)         site  │
//!                            └────────┼─────────────────────────────────────┘
//!                                     ▼
//!                               Backend origin
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use clinic_gateway::config::load_config;
use clinic_gateway::lifecycle::{wait_for_shutdown_signal, Shutdown};
use clinic_gateway::observability::{logging, metrics};
use clinic_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "clinic-gateway", version, about = "Clinic front-end gateway")]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        "clinic-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        trigger.trigger();
    });

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
