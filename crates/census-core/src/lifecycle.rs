//! Store lifecycle states.
//!
//! ```text
//! Uninitialized ──▶ Initializing ──▶ Ready ──▶ Closed
//!                        │
//!                        └──▶ Failed
//! ```
//!
//! `Initializing → Ready` happens at most once. `Failed` and `Closed` are
//! terminal.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StoreState {
  Uninitialized,
  Initializing,
  Ready,
  /// Schema creation failed; the store cannot serve requests.
  Failed { reason: String },
  Closed,
}

/// Default backup location inside `dir`: `backup-<unix millis>.db`.
pub fn default_backup_path(dir: &Path, now: DateTime<Utc>) -> PathBuf {
  dir.join(format!("backup-{}.db", now.timestamp_millis()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_backup_path_uses_millis() {
    let now = DateTime::parse_from_rfc3339("2024-03-01T08:00:00.250Z")
      .unwrap()
      .with_timezone(&Utc);
    let p = default_backup_path(Path::new("backups"), now);
    assert_eq!(p, PathBuf::from("backups/backup-1709280000250.db"));
  }

  #[test]
  fn state_serializes_with_tag() {
    let failed = StoreState::Failed { reason: "disk full".into() };
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["state"], "failed");
    assert_eq!(json["reason"], "disk full");
    assert_eq!(serde_json::to_value(StoreState::Ready).unwrap()["state"], "ready");
  }
}
