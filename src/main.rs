//! GA4 proxy server.
//!
//! ```text
//!   Browser                    ga4-proxy                         Google
//!   ───────                    ─────────                         ──────
//!   POST /ga4-auth  ───────▶  validate type/code  ──form──▶  oauth2.googleapis.com/token
//!                   ◀───────  relay / 400 on OAuth error  ◀──
//!
//!   POST /ga4-data  ───────▶  validate fields     ──json──▶  analyticsdata.googleapis.com
//!                   ◀───────  relay / upstream status     ◀──   properties/{id}:runReport
//! ```
//!
//! Credentials come from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and
//! `REDIRECT_URI` (overriding the optional TOML config file).

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ga4_proxy::config::load_config;
use ga4_proxy::http::HttpServer;
use ga4_proxy::lifecycle::{wait_for_signal, Shutdown};
use ga4_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "ga4-proxy")]
#[command(about = "Proxy for Google OAuth token exchange and GA4 reports", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GA4_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ga4-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        token_url = %config.google.token_url,
        analytics_base_url = %config.google.analytics_base_url,
        credentials = config.google.has_credentials(),
        "Configuration loaded"
    );
    if !config.google.has_credentials() {
        tracing::warn!("OAuth credentials incomplete; Google will reject token exchanges");
    }

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
