//! Handlers for `/water-scheme-data`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use jal_core::{
  stats::LpcdSummary,
  store::{SchemeStore, VillageQuery},
  village::VillageReading,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /water-scheme-data[?region=…&scheme_id=…&min_lpcd=…&zero_week=true]`
pub async fn list<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<VillageQuery>,
) -> Result<Json<Vec<VillageReading>>, ApiError> {
  if let (Some(min), Some(max)) = (query.min_lpcd, query.max_lpcd) {
    if min > max {
      return Err(ApiError::BadRequest(format!("min_lpcd {min} exceeds max_lpcd {max}")));
    }
  }
  let rows = store
    .list_village_readings(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub region: Option<String>,
}

/// `GET /water-scheme-data/summary[?region=…]`
pub async fn summary<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<LpcdSummary>, ApiError> {
  let query = VillageQuery { region: params.region.clone(), ..VillageQuery::default() };
  let rows = store
    .list_village_readings(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(LpcdSummary::from_readings(params.region, &rows)))
}
