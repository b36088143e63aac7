//! Runtime configuration.
//!
//! Loaded from an optional TOML file layered with `CENSUS_`-prefixed
//! environment variables (e.g. `CENSUS_PORT=9000`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Directory for backups taken without an explicit target.
  #[serde(default = "default_backup_dir")]
  pub backup_dir: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("census.db") }

fn default_backup_dir() -> PathBuf { PathBuf::from("backups") }

impl ServerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CENSUS"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.backup_dir = expand_tilde(&cfg.backup_dir);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
