//! Handler for `POST /backup`.
//!
//! Body is optional: `{"path": "/some/file.db"}`. Without it the copy goes to
//! `backup-<unix millis>.db` inside the configured backup directory.

use std::path::PathBuf;

use axum::{Json, body::Bytes, extract::State};
use census_core::{HouseholdStore, default_backup_path};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct BackupBody {
  pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct BackupDone {
  pub path: PathBuf,
}

/// `POST /backup` — returns the path the copy was written to.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  body: Bytes,
) -> Result<Json<BackupDone>, ApiError>
where
  S: HouseholdStore,
{
  let requested = if body.is_empty() {
    None
  } else {
    serde_json::from_slice::<BackupBody>(&body)
      .map_err(|e| ApiError::BadRequest(format!("invalid backup body: {e}")))?
      .path
  };

  let path = match requested {
    Some(path) => path,
    None => {
      tokio::fs::create_dir_all(&state.backup_dir)
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      default_backup_path(&state.backup_dir, Utc::now())
    }
  };

  state
    .store
    .backup_to(path.clone())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(BackupDone { path }))
}
