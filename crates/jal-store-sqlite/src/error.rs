//! Error type for `jal-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] jal_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {kind} in column: {value:?}")]
  UnknownVariant {
    kind:  &'static str,
    value: String,
  },

  /// A row in a batch failed validation; nothing from the batch was written.
  #[error("row {index} rejected: {source}")]
  InvalidRow {
    index:  usize,
    #[source]
    source: jal_core::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
