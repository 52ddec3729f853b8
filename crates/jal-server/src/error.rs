//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::translate::TranslateError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("workbook already imported as batch {batch_id} at {imported_at}")]
  DuplicateImport {
    batch_id:    Uuid,
    imported_at: DateTime<Utc>,
  },

  #[error(transparent)]
  Workbook(#[from] jal_xlsx::Error),

  #[error(transparent)]
  Translate(#[from] TranslateError),

  #[error("background task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Error::Store(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::BadRequest(_) | Error::Workbook(_) => StatusCode::BAD_REQUEST,
      Error::DuplicateImport { .. } => StatusCode::CONFLICT,
      Error::Translate(e) => {
        tracing::warn!(error = %e, "translation failed");
        StatusCode::BAD_GATEWAY
      }
      Error::Join(_) | Error::Store(_) => {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, Error::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"jal\""),
      );
    }
    res
  }
}
