//! Error types for `census-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown relationship: {0:?}")]
  UnknownRelationship(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classification hooks that boundary layers use to map backend errors
/// without knowing the concrete backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The write violated a storage-level constraint and was rolled back.
  fn is_constraint(&self) -> bool;

  /// The store has been closed and can no longer serve requests.
  fn is_closed(&self) -> bool;
}
