//! Handler for `GET /search`.
//!
//! A missing or empty `q` matches every household; callers that want "no
//! results" for blank input must special-case it themselves.

use axum::{
  Json,
  extract::{Query, State},
};
use census_core::{Household, HouseholdStore};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Substring matched against names, barangay, town and province.
  #[serde(default)]
  pub q: String,
}

/// `GET /search[?q=...]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Household>>, ApiError>
where
  S: HouseholdStore,
{
  let households = state
    .store
    .search_households(&params.q)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(households))
}
