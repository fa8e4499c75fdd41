use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

use lattedrops::config::{FileConfig, load_config};

mod cli;

#[derive(Parser)]
#[command(name = "drops")]
#[command(about = "Share images into ephemeral drop rooms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to drops.toml (defaults to ./drops.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Relay URL, e.g. ws://127.0.0.1:4455
    #[arg(long, global = true)]
    relay: Option<String>,

    /// Room key; `share` creates a fresh room when omitted
    #[arg(long, global = true)]
    room: Option<String>,

    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish an image file or image URL into a room
    Share {
        /// Path to an image file, or an http(s) image URL
        source: String,
    },
    /// Watch a room and render whatever arrives
    Watch {
        /// Directory for received images (defaults to the system temp dir)
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_directive = if args.debug {
        "lattedrops=debug,drops=debug,info"
    } else {
        "lattedrops=info,drops=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let config_path = args.config.unwrap_or_else(|| PathBuf::from("drops.toml"));
    let config: FileConfig = load_config(&config_path)
        .extract()
        .context("invalid drops configuration")?;

    let relay_url = args.relay.unwrap_or(config.relay.url);
    let limits = config.limits.to_limits();

    match args.command {
        Commands::Share { source } => {
            cli::share::run(&relay_url, args.room.as_deref(), limits, &source).await
        }
        Commands::Watch { save_dir } => {
            cli::watch::run(&relay_url, args.room.as_deref(), limits, save_dir).await
        }
    }
}
