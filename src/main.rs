// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! chunkd: chunked file store over HTTP
//!
//! Usage:
//!   chunkd serve                          # stock deployment: ./downloads, :8080
//!   chunkd serve --config chunkd.toml
//!   chunkd status --config chunkd.toml    # list stored items

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chunkd::api::{self, AppState};
use chunkd::config::Config;
use chunkd::storage::layout::UploadRoot;

#[derive(Parser)]
#[command(name = "chunkd", about = "Chunked file store", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the upload/download API.
    Serve {
        /// Optional TOML configuration file; defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List stored items and their chunk counts, then exit.
    Status {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Serve { config } => run_serve(config.as_deref()).await,
        Command::Status { config } => run_status(config.as_deref()),
    };

    if let Err(e) = outcome {
        error!("Fatal: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::from_file(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(Config::default()),
    }
}

async fn run_serve(config_path: Option<&Path>) -> anyhow::Result<()> {
    let cfg = load_config(config_path)?;

    info!(
        root = ?cfg.storage.root,
        chunk_size = cfg.storage.chunk_size,
        record_length = cfg.storage.record_length,
        max_upload_bytes = cfg.api.max_upload_bytes,
        "Starting chunkd"
    );

    let port = cfg.api.port;
    let state = Arc::new(AppState::new(cfg).context("preparing upload root")?);

    tokio::select! {
        res = api::start_server(state, port) => {
            res.context("HTTP server")?;
        }
        res = tokio::signal::ctrl_c() => {
            res.context("signal handler")?;
            info!("Received CTRL+C, shutting down…");
        }
    }
    Ok(())
}

fn run_status(config_path: Option<&Path>) -> anyhow::Result<()> {
    let cfg = load_config(config_path)?;
    let root = UploadRoot::open(&cfg.storage.root)?;
    let items = root.scan_items()?;

    println!("=== chunkd Status ===");
    println!("Upload root : {}", root.path().display());
    println!("Chunk size  : {} bytes", cfg.storage.chunk_size);
    println!("Items       : {}", items.len());
    for item in &items {
        println!("  {} ({} chunks)", item.name, item.chunks);
    }
    Ok(())
}
