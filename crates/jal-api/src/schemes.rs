//! Handlers for `/schemes` and `/hierarchy`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/schemes` | Filters: `region`, `circle`, `division`, `sub_division`, `block`, `completion`, `text`, `limit`, `offset` |
//! | `GET`  | `/schemes/{scheme_id}` | Every block row of a scheme; 404 if none |
//! | `GET`  | `/schemes/{scheme_id}/{block}` | 404 if not found |
//! | `GET`  | `/hierarchy` | Optional `?region=` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use jal_core::{
  hierarchy::HierarchyNode,
  scheme::{SchemeKey, SchemeView},
  store::{SchemeQuery, SchemeStore},
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /schemes[?region=…&completion=…&text=…]`
pub async fn list<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<SchemeQuery>,
) -> Result<Json<Vec<SchemeView>>, ApiError> {
  let schemes = store.list_schemes(&query).await.map_err(ApiError::store)?;
  Ok(Json(schemes.into_iter().map(|s| s.into_view()).collect()))
}

/// `GET /schemes/{scheme_id}`
pub async fn by_id<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Path(scheme_id): Path<String>,
) -> Result<Json<Vec<SchemeView>>, ApiError> {
  let rows = store
    .schemes_by_id(scheme_id.clone())
    .await
    .map_err(ApiError::store)?;
  if rows.is_empty() {
    return Err(ApiError::NotFound(format!("scheme {scheme_id}")));
  }
  Ok(Json(rows.into_iter().map(|s| s.into_view()).collect()))
}

/// `GET /schemes/{scheme_id}/{block}`
pub async fn get_one<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Path((scheme_id, block)): Path<(String, String)>,
) -> Result<Json<SchemeView>, ApiError> {
  let key = SchemeKey { scheme_id, block };
  store
    .get_scheme(key.clone())
    .await
    .map_err(ApiError::store)?
    .map(|s| Json(s.into_view()))
    .ok_or_else(|| ApiError::NotFound(format!("scheme {} in block {}", key.scheme_id, key.block)))
}

#[derive(Debug, Deserialize)]
pub struct HierarchyParams {
  pub region: Option<String>,
}

/// `GET /hierarchy[?region=…]`
pub async fn hierarchy<S: SchemeStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<HierarchyParams>,
) -> Result<Json<Vec<HierarchyNode>>, ApiError> {
  let rows = store
    .hierarchy(params.region)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(HierarchyNode::build(&rows)))
}
