//! JSON REST API for the Jal water-scheme monitor.
//!
//! Exposes an axum [`Router`] backed by any [`jal_core::store::SchemeStore`].
//! Auth, uploads and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", jal_api::api_router(store.clone()))
//! ```

pub mod activity;
pub mod error;
pub mod regions;
pub mod schemes;
pub mod water;

use std::sync::Arc;

use axum::{Router, routing::get};
use jal_core::store::SchemeStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SchemeStore + 'static,
{
  Router::new()
    // Regions
    .route("/regions", get(regions::list::<S>))
    .route("/regions/summary", get(regions::summary::<S>))
    .route("/regions/{name}", get(regions::get_one::<S>))
    // Schemes
    .route("/schemes", get(schemes::list::<S>))
    .route("/schemes/{scheme_id}", get(schemes::by_id::<S>))
    .route("/schemes/{scheme_id}/{block}", get(schemes::get_one::<S>))
    .route("/hierarchy", get(schemes::hierarchy::<S>))
    // Village water data
    .route("/water-scheme-data", get(water::list::<S>))
    .route("/water-scheme-data/summary", get(water::summary::<S>))
    // Activity
    .route("/activity-logs", get(activity::list::<S>).post(activity::create::<S>))
    .with_state(store)
}
