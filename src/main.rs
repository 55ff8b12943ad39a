//! QuartzKV server binary.
//!
//! Parses the configuration, installs logging, starts the expiry sweeper,
//! and serves clients until Ctrl+C.

use anyhow::Context;
use clap::Parser;
use quartzkv::config::Config;
use quartzkv::connection::ConnectionStats;
use quartzkv::server;
use quartzkv::storage::{ExpirySweeper, StorageEngine};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level {:?}", config.log_level))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    info!(
        version = quartzkv::VERSION,
        maxmemory = config.maxmemory,
        "QuartzKV starting"
    );

    // Shared across all connections
    let storage = Arc::new(StorageEngine::with_max_memory(config.maxmemory));
    let stats = Arc::new(ConnectionStats::new());

    let _sweeper = ExpirySweeper::start(Arc::clone(&storage), config.expiry_config());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!(address = %config.bind_address(), "Ready to accept connections");

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    server::serve_until(listener, storage, stats, shutdown).await;

    info!("Server shutdown complete");
    Ok(())
}
