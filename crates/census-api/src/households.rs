//! Handlers for `/households` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/households` | Newest first, each with `family_count` |
//! | `POST`   | `/households` | Body: [`CensusRecord`]; returns 201 + `{"household_id": n}` |
//! | `GET`    | `/households/:id` | Household with ordered `family_members`; 404 if missing |
//! | `PUT`    | `/households/:id` | Body: [`CensusRecord`]; replaces fields and members; 204 |
//! | `DELETE` | `/households/:id` | Returns `{"affected_rows": n}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{CensusRecord, Household, HouseholdDetail, HouseholdId, HouseholdStore};
use serde::Serialize;

use crate::{ApiState, error::ApiError, extract::JsonBody};

fn validate(record: &CensusRecord) -> Result<(), ApiError> {
  if record.household.has_required_names() {
    Ok(())
  } else {
    Err(ApiError::BadRequest(
      "first_name and last_name are required".to_owned(),
    ))
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /households`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Household>>, ApiError>
where
  S: HouseholdStore,
{
  let households = state
    .store
    .get_all_households()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(households))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Created {
  pub household_id: HouseholdId,
}

/// `POST /households` — returns 201 + the new household id.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(record): JsonBody<CensusRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HouseholdStore,
{
  validate(&record)?;
  let household_id = state
    .store
    .save_census_record(record.household, record.family_members)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(Created { household_id })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /households/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<HouseholdId>,
) -> Result<Json<HouseholdDetail>, ApiError>
where
  S: HouseholdStore,
{
  let detail = state
    .store
    .get_household_by_id(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("household {id} not found")))?;
  Ok(Json(detail))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /households/:id` — replaces every field and the whole member list.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<HouseholdId>,
  JsonBody(record): JsonBody<CensusRecord>,
) -> Result<StatusCode, ApiError>
where
  S: HouseholdStore,
{
  validate(&record)?;
  let changed = state
    .store
    .update_household(id, record.household, record.family_members)
    .await
    .map_err(ApiError::from_store)?;
  if changed == 0 {
    return Err(ApiError::NotFound(format!("household {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub affected_rows: usize,
}

/// `DELETE /households/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<HouseholdId>,
) -> Result<Json<Deleted>, ApiError>
where
  S: HouseholdStore,
{
  let affected_rows = state
    .store
    .delete_household(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Deleted { affected_rows }))
}
