//! Async HTTP client wrapping the Jal JSON API.

use anyhow::{Context, Result, anyhow};
use jal_core::{
  scheme::SchemeView,
  stats::{RegionSummary, Totals},
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Connection settings for the Jal API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
    let resp = self
      .client
      .get(self.url(path))
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {path} → {}", resp.status()));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  /// `GET /api/regions`
  pub async fn regions(&self) -> Result<Vec<RegionSummary>> { self.get("/regions", &[]).await }

  /// `GET /api/regions/summary`
  pub async fn totals(&self) -> Result<Totals> { self.get("/regions/summary", &[]).await }

  /// `GET /api/schemes?region=<name>`
  pub async fn schemes_in(&self, region: &str) -> Result<Vec<SchemeView>> {
    self.get("/schemes", &[("region", region)]).await
  }
}
