//! JSON REST API for the census household store.
//!
//! Exposes an axum [`Router`] backed by any [`census_core::HouseholdStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", census_api::api_router(store.clone(), backup_dir))
//! ```

pub mod backup;
pub mod error;
pub mod extract;
pub mod households;
pub mod search;
pub mod statistics;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use census_core::HouseholdStore;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  /// Where `POST /backup` writes when no explicit path is given.
  pub backup_dir: PathBuf,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      backup_dir: self.backup_dir.clone(),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, backup_dir: PathBuf) -> Router<()>
where
  S: HouseholdStore + 'static,
{
  Router::new()
    // Households
    .route(
      "/households",
      get(households::list::<S>).post(households::create::<S>),
    )
    .route(
      "/households/{id}",
      get(households::get_one::<S>)
        .put(households::update::<S>)
        .delete(households::delete_one::<S>),
    )
    // Queries
    .route("/search", get(search::handler::<S>))
    .route("/statistics", get(statistics::handler::<S>))
    // Lifecycle
    .route("/backup", post(backup::handler::<S>))
    .with_state(ApiState { store, backup_dir })
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use census_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_router(backup_dir: PathBuf) -> (Router, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    (api_router(store.clone(), backup_dir), store)
  }

  async fn oneshot_json(
    app:    Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn juan() -> Value {
    json!({
      "first_name": "Juan",
      "last_name": "Dela Cruz",
      "barangay": "San Isidro",
      "province": "Cebu",
      "family_members": [
        {"first_name": "Pedro", "last_name": "Dela Cruz", "relationship": "son", "age": 10},
        {"first_name": "Maria", "last_name": "Dela Cruz", "relationship": "mother", "age": 45}
      ]
    })
  }

  async fn create(app: &Router, body: Value) -> i64 {
    let (status, value) = oneshot_json(app.clone(), "POST", "/households", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value["household_id"].as_i64().unwrap()
  }

  // ── Households ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_get_returns_ordered_detail() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let id = create(&app, juan()).await;
    assert!(id > 0);

    let (status, value) =
      oneshot_json(app, "GET", &format!("/households/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["id"], id);
    assert_eq!(value["province"], "Cebu");
    assert_eq!(value["family_count"], 2);
    assert_eq!(value["family_members"][0]["relationship"], "mother");
    assert_eq!(value["family_members"][1]["relationship"], "son");
  }

  #[tokio::test]
  async fn create_with_blank_name_returns_400() {
    let (app, store) = make_router(PathBuf::from("backups")).await;
    let (status, value) = oneshot_json(
      app,
      "POST",
      "/households",
      Some(json!({"first_name": "  ", "last_name": "Dela Cruz"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().contains("first_name"));
    assert!(store.get_all_households().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_relationship_is_rejected() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let (status, value) = oneshot_json(
      app,
      "POST",
      "/households",
      Some(json!({
        "first_name": "Juan",
        "last_name": "Dela Cruz",
        "family_members": [
          {"first_name": "X", "last_name": "Y", "relationship": "neighbour"}
        ]
      })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(value["error"].as_str().unwrap().contains("neighbour"), "{value}");
  }

  #[tokio::test]
  async fn malformed_body_returns_json_error() {
    let (app, store) = make_router(PathBuf::from("backups")).await;
    let request = Request::builder()
      .method("POST")
      .uri("/households")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{\"first_name\": "))
      .unwrap();
    let resp = app.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(value["error"].is_string());

    let request = Request::builder()
      .method("POST")
      .uri("/households")
      .body(Body::from(juan().to_string()))
      .unwrap();
    let resp = app.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(value["error"].is_string());
    assert!(store.get_all_households().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn get_missing_household_returns_404() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let (status, value) = oneshot_json(app, "GET", "/households/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(value["error"].as_str().unwrap().contains("99"));
  }

  #[tokio::test]
  async fn list_includes_member_counts() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    create(&app, json!({"first_name": "Ana", "last_name": "Santos"})).await;
    let id = create(&app, juan()).await;

    let (status, value) = oneshot_json(app, "GET", "/households", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = value.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["family_count"], 2);
    assert_eq!(list[1]["family_count"], 0);
  }

  #[tokio::test]
  async fn update_replaces_members() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let id = create(&app, juan()).await;

    let (status, _) = oneshot_json(
      app.clone(),
      "PUT",
      &format!("/households/{id}"),
      Some(json!({
        "first_name": "Juan",
        "last_name": "Dela Cruz",
        "family_members": [
          {"first_name": "Jose", "last_name": "Dela Cruz", "relationship": "father", "age": 70}
        ]
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, value) = oneshot_json(app, "GET", &format!("/households/{id}"), None).await;
    assert_eq!(value["family_count"], 1);
    assert_eq!(value["family_members"][0]["first_name"], "Jose");
    assert_eq!(value["province"], Value::Null);
  }

  #[tokio::test]
  async fn update_missing_household_returns_404() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let (status, _) = oneshot_json(
      app,
      "PUT",
      "/households/12",
      Some(json!({"first_name": "Juan", "last_name": "Dela Cruz"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_reports_affected_rows() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let id = create(&app, juan()).await;

    let uri = format!("/households/{id}");
    let (status, value) = oneshot_json(app.clone(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["affected_rows"], 1);

    let (_, value) = oneshot_json(app.clone(), "DELETE", &uri, None).await;
    assert_eq!(value["affected_rows"], 0);

    let (status, _) = oneshot_json(app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Queries ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn search_matches_case_insensitively() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let id = create(&app, juan()).await;
    create(&app, json!({"first_name": "Ana", "last_name": "Santos"})).await;

    let (status, value) = oneshot_json(app.clone(), "GET", "/search?q=CRUZ", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["id"], id);

    let (_, value) = oneshot_json(app.clone(), "GET", "/search?q=san%20isi", None).await;
    assert_eq!(value[0]["id"], id);

    let (_, value) = oneshot_json(app, "GET", "/search", None).await;
    assert_eq!(value.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn statistics_on_empty_store() {
    let (app, _store) = make_router(PathBuf::from("backups")).await;
    let (status, value) = oneshot_json(app, "GET", "/statistics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total_households"], 0);
    assert_eq!(value["total_family_members"], 0);
    assert_eq!(value["avg_family_size"], 0.0);
    assert_eq!(value["max_family_size"], 0);
  }

  // ── Backup & lifecycle ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn backup_to_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _store) = make_router(dir.path().join("unused")).await;
    create(&app, juan()).await;

    let target = dir.path().join("explicit.db");
    let (status, value) = oneshot_json(
      app,
      "POST",
      "/backup",
      Some(json!({ "path": target })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{value}");
    assert_eq!(value["path"].as_str(), target.to_str());
    assert!(target.exists());
    assert!(!dir.path().join("unused").exists());
  }

  #[tokio::test]
  async fn backup_defaults_into_backup_dir() {
    let dir = tempfile::tempdir().unwrap();
    let backup_dir = dir.path().join("backups");
    let (app, _store) = make_router(backup_dir.clone()).await;
    create(&app, juan()).await;

    let (status, value) = oneshot_json(app, "POST", "/backup", None).await;
    assert_eq!(status, StatusCode::OK, "{value}");

    let written = PathBuf::from(value["path"].as_str().unwrap());
    assert!(written.starts_with(&backup_dir));
    let name = written.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("backup-") && name.ends_with(".db"), "{name}");
    assert!(written.exists());
  }

  #[tokio::test]
  async fn backup_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _store) = make_router(dir.path().to_path_buf()).await;

    let target = dir.path().join("no-such-dir").join("b.db");
    let (status, value) =
      oneshot_json(app, "POST", "/backup", Some(json!({ "path": target }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(value["error"].as_str().unwrap().contains("backup"));
  }

  #[tokio::test]
  async fn closed_store_returns_503() {
    let (app, store) = make_router(PathBuf::from("backups")).await;
    store.close().await.unwrap();

    let (status, value) = oneshot_json(app, "GET", "/households", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(value["error"].as_str().unwrap().contains("closed"));
  }
}
