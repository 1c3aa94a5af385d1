//! # slingd
//!
//! Gravity Sling lobby server binary — merges config file and flags,
//! initializes logging and metrics, and starts the HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sling_server::config::ServerConfig;
use sling_server::metrics;
use sling_server::server::LobbyServer;
use tracing_subscriber::EnvFilter;

/// Gravity Sling lobby server.
#[derive(Parser, Debug)]
#[command(name = "slingd", about = "Gravity Sling lobby server")]
struct Cli {
    /// Host to bind (default `0.0.0.0` unless set in the config file).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (default 8080 unless set in the
    /// config file).
    #[arg(long)]
    port: Option<u16>,

    /// Optional JSON configuration file; flags override file values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum concurrent players (overrides the config file).
    #[arg(long)]
    max_players: Option<usize>,
}

fn build_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
            ..ServerConfig::default()
        },
    };
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(max_players) = cli.max_players {
        config.max_players = max_players;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = build_config(&args)?;
    let metrics_handle = metrics::install_recorder();

    let server = LobbyServer::new(config).with_metrics(metrics_handle);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("lobby listening on http://{addr}");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().graceful_shutdown(None).await;
    let _ = handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
