//! Text translation for the dashboard's chatbot overlay.
//!
//! The server only relays: the browser sends text and a target language, the
//! configured endpoint does the work. The endpoint speaks the public
//! `translate_a/single?client=gtx` protocol, whose response is a nested JSON
//! array with one `[translated, original, …]` entry per sentence.

use std::{future::Future, time::Duration};

use axum::{Json, extract::State};
use jal_core::store::SchemeStore;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{AppState, error::Error};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
  pub endpoint:       String,
  /// Source language used when the request does not name one.
  pub default_source: String,
  /// Longest accepted input, in characters.
  pub max_chars:      usize,
  pub timeout_secs:   u64,
}

impl Default for TranslateConfig {
  fn default() -> Self {
    Self {
      endpoint:       "https://translate.googleapis.com/translate_a/single".into(),
      default_source: "auto".into(),
      max_chars:      5000,
      timeout_secs:   10,
    }
  }
}

// ─── Translator ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TranslateError {
  #[error("translation request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("translation service returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("unexpected translation response: {0}")]
  Malformed(&'static str),
}

pub trait Translator: Send + Sync {
  fn translate(
    &self,
    text: String,
    source: String,
    target: String,
  ) -> impl Future<Output = Result<String, TranslateError>> + Send + '_;
}

/// [`Translator`] backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
  client:   Client,
  endpoint: String,
}

impl HttpTranslator {
  pub fn new(config: &TranslateConfig) -> Result<Self, TranslateError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      endpoint: config.endpoint.clone(),
    })
  }
}

impl Translator for HttpTranslator {
  async fn translate(
    &self,
    text: String,
    source: String,
    target: String,
  ) -> Result<String, TranslateError> {
    let response = self
      .client
      .get(&self.endpoint)
      .query(&[
        ("client", "gtx"),
        ("sl", source.as_str()),
        ("tl", target.as_str()),
        ("dt", "t"),
        ("q", text.as_str()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(TranslateError::Status { status: status.as_u16(), body });
    }

    let body: Value = response.json().await?;
    join_sentences(&body)
  }
}

/// Concatenate the translated sentence fragments of a `client=gtx` response.
pub(crate) fn join_sentences(body: &Value) -> Result<String, TranslateError> {
  let sentences = body
    .get(0)
    .and_then(Value::as_array)
    .ok_or(TranslateError::Malformed("missing sentence list"))?;

  Ok(
    sentences
      .iter()
      .filter_map(|s| s.get(0).and_then(Value::as_str))
      .collect(),
  )
}

// ─── Handler ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
  pub text:   String,
  pub source: Option<String>,
  pub target: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Translated {
  pub translated: String,
}

/// `POST /api/translate`
pub async fn handler<S, T>(
  State(state): State<AppState<S, T>>,
  Json(body): Json<TranslateRequest>,
) -> Result<Json<Translated>, Error>
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  let limit = state.config.translate.max_chars;
  if body.text.chars().count() > limit {
    return Err(Error::BadRequest(format!("text is longer than {limit} characters")));
  }
  if body.target.trim().is_empty() {
    return Err(Error::BadRequest("target language is required".into()));
  }
  if body.text.trim().is_empty() {
    return Ok(Json(Translated { translated: String::new() }));
  }

  let source = body
    .source
    .filter(|s| !s.trim().is_empty())
    .unwrap_or_else(|| state.config.translate.default_source.clone());
  let translated = state
    .translator
    .translate(body.text, source, body.target)
    .await?;
  Ok(Json(Translated { translated }))
}
