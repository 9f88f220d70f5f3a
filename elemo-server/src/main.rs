//! Elemo server
//!
//! Loads configuration, verifies the license against the compiled-in public
//! key and only then starts serving. An invalid, tampered or expired license
//! stops the process before any listener is bound.
//!
//! Usage:
//!   elemo-server --config /etc/elemo/server.toml

use anyhow::{Context, Result};
use clap::Parser;
use elemo_server::{build_router, config::ServerConfig, startup};
use std::{net::SocketAddr, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "elemo-server")]
#[command(about = "Elemo project management server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the HTTP listen address
    #[arg(long)]
    address: Option<SocketAddr>,

    /// Override the license file path
    #[arg(long)]
    license: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.http.address = address;
    }
    if let Some(license) = args.license {
        config.license.file = license;
    }

    let directive = if args.verbose { "debug" } else { config.log.level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Elemo server starting...");
    let slot = startup::install_license(&config.license.file)?;

    #[cfg(unix)]
    tokio::spawn(startup::reload_on_hangup(
        slot.clone(),
        config.license.file.clone(),
    ));

    let app = build_router(slot);
    let listener = tokio::net::TcpListener::bind(config.http.address)
        .await
        .with_context(|| format!("failed to bind {}", config.http.address))?;
    info!("HTTP API listening on {}", config.http.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("HTTP server failed")
}
