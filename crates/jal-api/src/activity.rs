//! Handlers for `/activity-logs`.
//!
//! Recording is best effort: the dashboard fires these on every page view
//! and must never see a failure because of them.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
};
use jal_core::{
  activity::{Activity, NewActivity},
  store::SchemeStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Serialize, Deserialize)]
pub struct Accepted {
  /// `None` when the entry could not be stored.
  pub id: Option<Uuid>,
}

/// `POST /activity-logs`: always `202 Accepted`, even for a body that does
/// not parse.
pub async fn create<S: SchemeStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<NewActivity>, JsonRejection>,
) -> (StatusCode, Json<Accepted>) {
  let body = match body {
    Ok(Json(body)) => body,
    Err(rejection) => {
      tracing::warn!(error = %rejection.body_text(), "discarding malformed activity");
      return (StatusCode::ACCEPTED, Json(Accepted { id: None }));
    }
  };
  let id = match store.record_activity(body).await {
    Ok(activity) => Some(activity.id),
    Err(e) => {
      tracing::warn!(error = %e, "failed to record activity");
      None
    }
  };
  (StatusCode::ACCEPTED, Json(Accepted { id }))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /activity-logs[?limit=N]`, newest first.
pub async fn list<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Activity>>, ApiError> {
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
  let entries = store.recent_activity(limit).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}
