//! The Jal server: the read API plus the authenticated admin surface
//! (workbook import, URL repair, region refresh) and the translation relay.
//!
//! Everything the binary's offline subcommands do goes through the same
//! functions as the HTTP routes, see [`import`] and [`repair`].

pub mod admin;
pub mod auth;
pub mod error;
pub mod import;
pub mod repair;
pub mod translate;

pub use error::{Error, Result};

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use jal_core::{dashboard::DashboardConfig, hierarchy::RegionAliases, store::SchemeStore};
use jal_xlsx::ImportOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use translate::{HttpTranslator, TranslateConfig, Translator};

/// Largest accepted workbook upload.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `JAL_*`
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub admin_username:      String,
  /// Argon2 PHC string; see `jal-server hash-password`.
  pub admin_password_hash: String,
  pub dashboard:           DashboardConfig,
  pub import:              ImportOptions,
  pub translate:           TranslateConfig,
  /// Extra `alias = "Canonical Region"` spellings on top of the built-in table.
  pub region_aliases:      BTreeMap<String, String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "127.0.0.1".into(),
      port:                8080,
      store_path:          PathBuf::from("~/.local/share/jal/jal.db"),
      admin_username:      "admin".into(),
      admin_password_hash: String::new(),
      dashboard:           DashboardConfig::default(),
      import:              ImportOptions::default(),
      translate:           TranslateConfig::default(),
      region_aliases:      BTreeMap::new(),
    }
  }
}

impl ServerConfig {
  pub fn aliases(&self) -> RegionAliases {
    let mut aliases = RegionAliases::default();
    aliases.extend(&self.region_aliases);
    aliases
  }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.admin_username.clone(),
      password_hash: self.admin_password_hash.clone(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the admin and translation handlers.
pub struct AppState<S, T = HttpTranslator> {
  pub store:      Arc<S>,
  pub config:     Arc<ServerConfig>,
  pub auth:       Arc<AuthConfig>,
  pub aliases:    Arc<RegionAliases>,
  pub translator: Arc<T>,
}

impl<S, T> AppState<S, T> {
  pub fn new(store: S, config: ServerConfig, translator: T) -> Self {
    Self {
      store:      Arc::new(store),
      auth:       Arc::new(config.auth()),
      aliases:    Arc::new(config.aliases()),
      config:     Arc::new(config),
      translator: Arc::new(translator),
    }
  }
}

impl<S, T> Clone for AppState<S, T> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      config:     self.config.clone(),
      auth:       self.auth.clone(),
      aliases:    self.aliases.clone(),
      translator: self.translator.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S, T>(state: AppState<S, T>) -> Router
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  let stateful = Router::new()
    .route("/admin/import/schemes", post(admin::import_schemes::<S, T>))
    .route("/admin/import/water-data", post(admin::import_water_data::<S, T>))
    .route("/admin/repair-urls", post(admin::repair_urls::<S, T>))
    .route("/admin/refresh-regions", post(admin::refresh_regions::<S, T>))
    .route("/translate", post(translate::handler::<S, T>))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .with_state(state.clone());

  let api = jal_api::api_router(state.store.clone()).merge(stateful);

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

#[cfg(test)]
mod tests;
