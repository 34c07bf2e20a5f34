//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use dropbox_core::{AsDomainError, Error as DomainError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("insufficient funds: {0}")]
  InsufficientFunds(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store failure to a response, using the wrapped domain error when
  /// there is one.
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + AsDomainError + Send + Sync + 'static,
  {
    match e.as_domain() {
      Some(
        d @ (DomainError::UserNotFound(_)
        | DomainError::DepositNotFound(_)
        | DomainError::BoxNotFound(_)
        | DomainError::SongNotFound(_)),
      ) => ApiError::NotFound(d.to_string()),
      Some(d @ (DomainError::AlreadyDiscovered { .. } | DomainError::UsernameTaken(_))) => {
        ApiError::Conflict(d.to_string())
      }
      Some(d @ DomainError::InsufficientFunds { .. }) => {
        ApiError::InsufficientFunds(d.to_string())
      }
      _ => {
        tracing::error!(error = %e, "store failure");
        ApiError::Store(Box::new(e))
      }
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"dropbox\""),
        );
        return res;
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::InsufficientFunds(m) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "insufficient_funds", "message": m }),
      ),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() })),
    };
    (status, Json(body)).into_response()
  }
}
