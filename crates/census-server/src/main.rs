//! census-server binary.
//!
//! Reads `census.toml` (or the path given with `--config`), opens the SQLite
//! household store, and either serves the JSON API over HTTP or runs a
//! one-shot admin command.
//!
//! ```text
//! census-server serve
//! census-server backup /mnt/usb/census-backup.db
//! census-server stats
//! ```

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use census_core::{HouseholdStore, default_backup_path};
use census_store_sqlite::SqliteStore;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Census household store server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "census.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API over HTTP.
  Serve,
  /// Copy the store to PATH (default: a timestamped file in `backup_dir`).
  Backup { path: Option<PathBuf> },
  /// Print store statistics as JSON.
  Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  store
    .ensure_initialized()
    .await
    .with_context(|| format!("failed to initialise store at {:?}", cfg.store_path))?;

  let result = match cli.command {
    Command::Serve => serve(&store, &cfg).await,
    Command::Backup { path } => backup(&store, &cfg, path).await,
    Command::Stats => stats(&store).await,
  };

  store.close().await.context("failed to close store")?;
  result
}

async fn serve(store: &SqliteStore, cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = census_api::api_router(Arc::new(store.clone()), cfg.backup_dir.clone())
    .layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shutting down");
  Ok(())
}

async fn backup(
  store: &SqliteStore,
  cfg:   &ServerConfig,
  path:  Option<PathBuf>,
) -> anyhow::Result<()> {
  let path = match path {
    Some(path) => path,
    None => {
      tokio::fs::create_dir_all(&cfg.backup_dir)
        .await
        .with_context(|| format!("failed to create {:?}", cfg.backup_dir))?;
      default_backup_path(&cfg.backup_dir, Utc::now())
    }
  };

  store
    .backup_to(path.clone())
    .await
    .with_context(|| format!("backup to {path:?} failed"))?;
  println!("Backup stored at {}", path.display());
  Ok(())
}

async fn stats(store: &SqliteStore) -> anyhow::Result<()> {
  let stats = store.get_statistics().await.context("failed to read statistics")?;
  println!("{}", serde_json::to_string_pretty(&stats)?);
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    // Keep serving; the process can still be stopped externally.
    std::future::pending::<()>().await;
  }
}
