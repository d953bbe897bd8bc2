//! Error type for the JSON API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::ai::{LlmError, TtsError};
use crate::db::DbLockError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Unavailable(String),

  #[error("Database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error(transparent)]
  Llm(#[from] LlmError),

  #[error(transparent)]
  Tts(#[from] TtsError),
}

impl From<DbLockError> for AppError {
  fn from(e: DbLockError) -> Self {
    Self::Unavailable(e.to_string())
  }
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::Llm(_) => StatusCode::BAD_GATEWAY,
      Self::Tts(TtsError::EmptyText | TtsError::TooLong { .. }) => StatusCode::BAD_REQUEST,
      Self::Tts(TtsError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
      Self::Tts(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::warn!("API error: {}", self);
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

pub type ApiResult<T> = Result<T, AppError>;
