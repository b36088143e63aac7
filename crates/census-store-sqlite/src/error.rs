//! Error type for `census-store-sqlite`.

use std::path::PathBuf;

use census_core::StoreError;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] census_core::Error),

  /// The schema could not be created. The store stays unusable for the rest
  /// of its lifetime.
  #[error("store initialization failed: {0}")]
  Initialization(String),

  /// A write violated a storage constraint; the enclosing transaction was
  /// rolled back.
  #[error("constraint violation: {0}")]
  Constraint(String),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("backup to {} failed: {source}", path.display())]
  Backup {
    path:   PathBuf,
    #[source]
    source: rusqlite::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store is closed")]
  Closed,

  #[error("decode error: {0}")]
  Decode(String),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::ConnectionClosed => Error::Closed,
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
        ffi,
        message,
      )) if ffi.code == ErrorCode::ConstraintViolation => {
        Error::Constraint(message.unwrap_or_else(|| ffi.to_string()))
      }
      other => Error::Database(other),
    }
  }
}

impl StoreError for Error {
  fn is_constraint(&self) -> bool { matches!(self, Error::Constraint(_)) }

  fn is_closed(&self) -> bool { matches!(self, Error::Closed) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
