use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::prelude::*;

use drop_relay::config::{FileConfig, RelayConfig, load_config};
use drop_relay::{AppState, router};

#[derive(Parser)]
#[command(name = "drop-relay")]
#[command(about = "Single-slot image relay for lattedrops rooms")]
struct Cli {
    /// Path to relay.toml (defaults to ./relay.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.debug {
        "drop_relay=debug,tower_http=debug,info"
    } else {
        "drop_relay=info,tower_http=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from("relay.toml"));
    let mut file_config: FileConfig = load_config(&config_path)
        .extract()
        .context("invalid relay configuration")?;
    if let Some(host) = cli.host {
        file_config.server.host = host;
    }
    if let Some(port) = cli.port {
        file_config.server.port = port;
    }
    let config = RelayConfig::from_file(&file_config)?;

    let state = AppState::new(config.max_payload_bytes);
    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("drop-relay listening on ws://{}", listener.local_addr()?);

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")
}
