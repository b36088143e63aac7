//! Request extractors whose rejections render as [`ApiError`] JSON bodies.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` with its rejection mapped through [`ApiError`], so a
/// malformed body gets `{"error": ...}` like every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
