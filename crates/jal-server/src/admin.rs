//! Handlers for `/api/admin/*`. Every route requires Basic auth.

use axum::{
  Json,
  extract::{Query, State},
};
use bytes::Bytes;
use jal_core::{
  activity::ImportKind,
  stats::RegionSummary,
  store::{SchemeStore, WriteMode},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::AdminAuth,
  error::{Error, Result},
  import::{ImportRequest, ImportSummary, import_workbook},
  repair::{RepairCounts, repair_all},
  translate::Translator,
};

#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
  #[serde(default)]
  pub mode:      WriteMode,
  #[serde(default)]
  pub force:     bool,
  pub file_name: Option<String>,
}

async fn import<S, T>(
  state: AppState<S, T>,
  kind: ImportKind,
  params: ImportParams,
  body: Bytes,
) -> Result<Json<ImportSummary>>
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  if body.is_empty() {
    return Err(Error::BadRequest("empty upload".into()));
  }
  let request = ImportRequest {
    bytes:     body.to_vec(),
    file_name: params.file_name,
    mode:      params.mode,
    force:     params.force,
  };
  let summary = import_workbook(&*state.store, &state.config, &state.aliases, kind, request).await?;
  Ok(Json(summary))
}

/// `POST /api/admin/import/schemes`; the body is the raw `.xlsx`.
pub async fn import_schemes<S, T>(
  _auth: AdminAuth,
  State(state): State<AppState<S, T>>,
  Query(params): Query<ImportParams>,
  body: Bytes,
) -> Result<Json<ImportSummary>>
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  import(state, ImportKind::SchemeStatus, params, body).await
}

/// `POST /api/admin/import/water-data`
pub async fn import_water_data<S, T>(
  _auth: AdminAuth,
  State(state): State<AppState<S, T>>,
  Query(params): Query<ImportParams>,
  body: Bytes,
) -> Result<Json<ImportSummary>>
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  import(state, ImportKind::WaterData, params, body).await
}

#[derive(Debug, Default, Deserialize)]
pub struct RepairParams {
  #[serde(default)]
  pub dry_run: bool,
}

/// `POST /api/admin/repair-urls[?dry_run=true]`
pub async fn repair_urls<S, T>(
  _auth: AdminAuth,
  State(state): State<AppState<S, T>>,
  Query(params): Query<RepairParams>,
) -> Result<Json<RepairCounts>>
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  let counts = repair_all(&*state.store, &state.config.dashboard, params.dry_run).await?;
  Ok(Json(counts))
}

/// `POST /api/admin/refresh-regions`
pub async fn refresh_regions<S, T>(
  _auth: AdminAuth,
  State(state): State<AppState<S, T>>,
) -> Result<Json<Vec<RegionSummary>>>
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  let regions = state
    .store
    .refresh_region_summaries()
    .await
    .map_err(Error::store)?;
  Ok(Json(regions))
}
