//! The `SchemeStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `jal-store-sqlite`).
//! Higher layers (`jal-api`, `jal-server`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  activity::{Activity, ImportBatch, NewActivity},
  hierarchy::Hierarchy,
  scheme::{CompletionStatus, NewScheme, SchemeKey, SchemeStatus},
  stats::RegionSummary,
  village::{NewVillageReading, VillageKey, VillageReading},
};

// ─── Write semantics ─────────────────────────────────────────────────────────

/// What to do when a row with the same key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
  /// Leave the existing row untouched.
  #[default]
  Skip,
  /// Overwrite the existing row's data; its dashboard URL is kept.
  Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
  Inserted,
  Updated,
  Skipped,
}

/// Tally of [`WriteOutcome`]s for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
  pub inserted:           u32,
  pub updated:            u32,
  pub skipped_duplicates: u32,
}

impl ImportCounts {
  pub fn add(&mut self, outcome: WriteOutcome) {
    match outcome {
      WriteOutcome::Inserted => self.inserted += 1,
      WriteOutcome::Updated => self.updated += 1,
      WriteOutcome::Skipped => self.skipped_duplicates += 1,
    }
  }

  pub fn written(&self) -> u32 { self.inserted + self.updated }
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`SchemeStore::list_schemes`]. Geographic filters match the
/// normalised segment case-insensitively.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemeQuery {
  pub region:       Option<String>,
  pub circle:       Option<String>,
  pub division:     Option<String>,
  pub sub_division: Option<String>,
  pub block:        Option<String>,
  pub completion:   Option<CompletionStatus>,
  /// Substring match over scheme id and scheme name.
  pub text:         Option<String>,
  pub limit:        Option<usize>,
  pub offset:       Option<usize>,
}

/// Parameters for [`SchemeStore::list_village_readings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VillageQuery {
  pub region:    Option<String>,
  pub scheme_id: Option<String>,
  pub block:     Option<String>,
  /// Lower bound (inclusive) on the latest LPCD reading.
  pub min_lpcd:  Option<f64>,
  /// Upper bound (inclusive) on the latest LPCD reading.
  pub max_lpcd:  Option<f64>,
  /// Only villages with zero supply for the whole week.
  #[serde(default)]
  pub zero_week: bool,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Jal store backend.
///
/// Implementations normalise hierarchy text and validate counters on every
/// write, so rows read back always satisfy the invariants in [`crate::scheme`]
/// and [`crate::village`].
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SchemeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schemes ───────────────────────────────────────────────────────────

  /// Write a single scheme row.
  fn upsert_scheme(
    &self,
    input: NewScheme,
    mode: WriteMode,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + '_;

  /// Write a batch of scheme rows in one transaction. Any invalid row or
  /// database failure rolls back the whole batch.
  fn import_schemes(
    &self,
    rows: Vec<NewScheme>,
    mode: WriteMode,
  ) -> impl Future<Output = Result<ImportCounts, Self::Error>> + Send + '_;

  /// Retrieve one scheme/block row. Returns `None` if not found.
  fn get_scheme(
    &self,
    key: SchemeKey,
  ) -> impl Future<Output = Result<Option<SchemeStatus>, Self::Error>> + Send + '_;

  /// All block rows of one scheme.
  fn schemes_by_id(
    &self,
    scheme_id: String,
  ) -> impl Future<Output = Result<Vec<SchemeStatus>, Self::Error>> + Send + '_;

  fn list_schemes<'a>(
    &'a self,
    query: &'a SchemeQuery,
  ) -> impl Future<Output = Result<Vec<SchemeStatus>, Self::Error>> + Send + 'a;

  /// Distinct hierarchy paths of all schemes, optionally within one region.
  fn hierarchy(
    &self,
    region: Option<String>,
  ) -> impl Future<Output = Result<Vec<Hierarchy>, Self::Error>> + Send + '_;

  /// Overwrite the dashboard URL of one scheme row. Returns `false` if the
  /// row does not exist.
  fn set_dashboard_url(
    &self,
    key: SchemeKey,
    url: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Regions ───────────────────────────────────────────────────────────

  /// Recompute every region row from the scheme rows and return them.
  fn refresh_region_summaries(
    &self,
  ) -> impl Future<Output = Result<Vec<RegionSummary>, Self::Error>> + Send + '_;

  fn list_regions(
    &self,
  ) -> impl Future<Output = Result<Vec<RegionSummary>, Self::Error>> + Send + '_;

  /// Look up a region by any known spelling.
  fn get_region(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<RegionSummary>, Self::Error>> + Send + '_;

  // ── Village readings ──────────────────────────────────────────────────

  /// Write a batch of village readings in one transaction.
  fn import_village_readings(
    &self,
    rows: Vec<NewVillageReading>,
    mode: WriteMode,
  ) -> impl Future<Output = Result<ImportCounts, Self::Error>> + Send + '_;

  fn list_village_readings<'a>(
    &'a self,
    query: &'a VillageQuery,
  ) -> impl Future<Output = Result<Vec<VillageReading>, Self::Error>> + Send + 'a;

  fn set_village_dashboard_url(
    &self,
    key: VillageKey,
    url: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Activity & audit ──────────────────────────────────────────────────

  /// Persist an activity entry; `id` and `recorded_at` are set by the store.
  fn record_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  /// Most recent activity first.
  fn recent_activity(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  fn record_import(
    &self,
    batch: ImportBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The earliest import of a workbook with this content hash, if any.
  fn find_import_by_hash(
    &self,
    content_sha256: String,
  ) -> impl Future<Output = Result<Option<ImportBatch>, Self::Error>> + Send + '_;
}
