//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use census_core::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The store rejected a write on a constraint and rolled it back.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The request body could not be decoded. Carries the extractor's status
  /// (400, 415 or 422).
  #[error("invalid body: {message}")]
  InvalidBody { status: StatusCode, message: String },

  /// The store is closed or otherwise unable to serve requests.
  #[error("unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error.
  pub fn from_store<E: StoreError>(err: E) -> Self {
    if err.is_constraint() {
      ApiError::Conflict(err.to_string())
    } else if err.is_closed() {
      ApiError::Unavailable(err.to_string())
    } else {
      ApiError::Store(Box::new(err))
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::InvalidBody {
      status:  rejection.status(),
      message: rejection.body_text(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::InvalidBody { status, message } => (*status, message.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
