//! Client activity log entries and workbook import audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::ImportCounts;

// ─── Activity ────────────────────────────────────────────────────────────────

/// What the dashboard user did. Unrecognised or missing kinds read as
/// [`Other`](Self::Other).
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
  strum::AsRefStr, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityKind {
  PageVisit,
  Download,
  Filter,
  Chat,
  #[default]
  #[serde(other)]
  Other,
}

/// Input to [`crate::store::SchemeStore::record_activity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
  pub session_id:    Option<String>,
  #[serde(default)]
  pub activity_type: ActivityKind,
  pub description:   Option<String>,
  pub page:          Option<String>,
  /// Arbitrary client payload (filter values, file names, …).
  pub metadata:      Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
  pub id:            Uuid,
  pub session_id:    Option<String>,
  pub activity_type: ActivityKind,
  pub description:   Option<String>,
  pub page:          Option<String>,
  pub metadata:      Option<serde_json::Value>,
  /// Server-assigned.
  pub recorded_at:   DateTime<Utc>,
}

// ─── Import batches ──────────────────────────────────────────────────────────

/// Which table a workbook feeds.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
  strum::AsRefStr, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImportKind {
  SchemeStatus,
  WaterData,
}

/// Audit record of one workbook import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
  pub batch_id:       Uuid,
  pub kind:           ImportKind,
  pub file_name:      Option<String>,
  /// Hex SHA-256 of the uploaded bytes; used to refuse repeat uploads.
  pub content_sha256: String,
  pub rows_read:      u32,
  #[serde(flatten)]
  pub counts:         ImportCounts,
  pub invalid_rows:   u32,
  pub imported_at:    DateTime<Utc>,
}
