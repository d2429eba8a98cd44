use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use turnstile::config::TurnstileConfig;
use turnstile::http::HttpServer;
use turnstile::limiter::RateLimiter;

/// Per-client fixed-window rate limiting HTTP service.
#[derive(Debug, Parser)]
#[command(name = "turnstile", version, about)]
struct Opts {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration file
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Turnstile Rate Limiting Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match &opts.config {
        Some(path) => TurnstileConfig::from_file(path)?,
        None => TurnstileConfig::default(),
    };
    let addr = opts.listen.unwrap_or(config.server.listen_addr);
    info!(addr = %addr, "Configuration loaded");

    // The limiter is built once and injected into the server; the seeded
    // clients go through the same path as runtime configuration updates.
    let limiter = Arc::new(RateLimiter::new(config.limits.defaults()));
    let now = Instant::now();
    for (identity, limits) in &config.limits.clients {
        if let Err(e) = limiter.apply_config(identity, (*limits).into(), now) {
            warn!(identity = %identity, error = %e, "Skipping invalid client limits");
        }
    }
    info!(clients = limiter.client_count(), "Rate limiter initialized");

    let server = HttpServer::new(addr, limiter);
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Turnstile Rate Limiting Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
