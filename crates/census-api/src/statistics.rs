//! Handler for `GET /statistics`.

use axum::{Json, extract::State};
use census_core::{HouseholdStore, Statistics};

use crate::{ApiState, error::ApiError};

pub async fn handler<S>(State(state): State<ApiState<S>>) -> Result<Json<Statistics>, ApiError>
where
  S: HouseholdStore,
{
  let stats = state
    .store
    .get_statistics()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats))
}
