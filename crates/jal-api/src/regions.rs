//! Handlers for `/regions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/regions` | All region summaries |
//! | `GET`  | `/regions/summary` | Totals across regions |
//! | `GET`  | `/regions/{name}` | Any known spelling; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use jal_core::{
  stats::{RegionSummary, Totals},
  store::SchemeStore,
};

use crate::error::ApiError;

/// `GET /regions`
pub async fn list<S: SchemeStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<RegionSummary>>, ApiError> {
  let regions = store.list_regions().await.map_err(ApiError::store)?;
  Ok(Json(regions))
}

/// `GET /regions/summary`
pub async fn summary<S: SchemeStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Totals>, ApiError> {
  let regions = store.list_regions().await.map_err(ApiError::store)?;
  Ok(Json(Totals::from_regions(&regions)))
}

/// `GET /regions/{name}`
pub async fn get_one<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Path(name): Path<String>,
) -> Result<Json<RegionSummary>, ApiError> {
  store
    .get_region(name.clone())
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("region {name:?}")))
}
