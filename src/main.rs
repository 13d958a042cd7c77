//! Yield Vault Dashboard Backend
//!
//! Serves the JSON API behind the vault dashboard.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser dashboard
//!        │  GET /api/vault/state, /api/vault/performance, /api/session ...
//!        ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │  http (axum)                                            │
//!   │    request id · trace · timeout · cors · metrics        │
//!   └──────┬───────────────────┬───────────────────┬──────────┘
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//!   ┌─────────────┐    ┌───────────────┐   ┌───────────────┐
//!   │   session   │    │  performance  │   │     chain     │
//!   │ (one wallet │    │   tracker +   │──▶│ VaultChain-   │
//!   │  session)   │    │    history    │   │    Client     │
//!   └─────────────┘    └───────────────┘   └──────┬────────┘
//!                                                 │ REST (/v1)
//!                                                 ▼
//!                                          Full node / vault program
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use vault_dashboard::chain::VaultChainClient;
use vault_dashboard::config::load_config;
use vault_dashboard::http::{AppState, HttpServer};
use vault_dashboard::lifecycle::{wait_for_signal, Shutdown};
use vault_dashboard::observability::{logging, metrics};
use vault_dashboard::performance::{PerformanceHistory, PerformanceTracker};
use vault_dashboard::session::WalletSession;

#[derive(Parser)]
#[command(name = "vault-dashboard")]
#[command(about = "JSON API for the yield vault dashboard", long_about = None)]
struct Args {
    /// Optional TOML configuration file; VAULT_* environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("vault-dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        network = %config.chain.network,
        vault_address = %config.chain.vault_address,
        performance_enabled = config.performance.enabled,
        "Configuration loaded"
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

    let client = Arc::new(VaultChainClient::new(config.chain.clone())?);
    if let Err(e) = client.verify_network().await {
        tracing::warn!(error = %e, "Network verification failed");
    }

    let shutdown = Shutdown::new();
    let history = Arc::new(PerformanceHistory::new(config.performance.max_samples));

    if config.performance.enabled {
        let tracker = PerformanceTracker::new(
            client.clone(),
            history.clone(),
            Duration::from_secs(config.performance.sample_interval_secs),
        );
        tokio::spawn(tracker.run(shutdown.listener()));
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let state = AppState {
        client,
        session: Arc::new(WalletSession::new()),
        history,
        config: Arc::new(config),
    };

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    HttpServer::new(state).run(listener, shutdown.listener()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
