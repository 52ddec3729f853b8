//! The workbook import pipeline shared by the admin routes and the CLI.
//!
//! ```text
//! bytes ─ sha256 ─ duplicate check ─ parse (blocking) ─ store ─ repair urls ─ refresh regions ─ audit
//! ```

use chrono::Utc;
use jal_core::{
  activity::{ImportBatch, ImportKind},
  hierarchy::RegionAliases,
  scheme::NewScheme,
  store::{ImportCounts, SchemeStore, WriteMode},
  village::NewVillageReading,
};
use jal_xlsx::{ImportOptions, ImportReport, Parsed};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
  ServerConfig,
  error::{Error, Result},
  repair::{self, DriftCounts},
};

/// A workbook upload and how to apply it.
#[derive(Debug, Clone)]
pub struct ImportRequest {
  pub bytes:     Vec<u8>,
  pub file_name: Option<String>,
  pub mode:      WriteMode,
  /// Import even if the same bytes were imported before.
  pub force:     bool,
}

/// Rows read from a workbook of either kind.
#[derive(Debug, Clone)]
pub enum ParsedWorkbook {
  Schemes(Parsed<NewScheme>),
  Water(Parsed<NewVillageReading>),
}

impl ParsedWorkbook {
  pub fn kind(&self) -> ImportKind {
    match self {
      ParsedWorkbook::Schemes(_) => ImportKind::SchemeStatus,
      ParsedWorkbook::Water(_) => ImportKind::WaterData,
    }
  }

  pub fn report(&self) -> &ImportReport {
    match self {
      ParsedWorkbook::Schemes(p) => &p.report,
      ParsedWorkbook::Water(p) => &p.report,
    }
  }

  pub fn parse(
    kind: ImportKind,
    bytes: &[u8],
    opts: &ImportOptions,
    aliases: &RegionAliases,
  ) -> jal_xlsx::Result<Self> {
    Ok(match kind {
      ImportKind::SchemeStatus => {
        ParsedWorkbook::Schemes(jal_xlsx::parse_scheme_workbook(bytes, opts, aliases)?)
      }
      ImportKind::WaterData => {
        ParsedWorkbook::Water(jal_xlsx::parse_water_workbook(bytes, opts, aliases)?)
      }
    })
  }
}

/// What an import did, returned to the uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
  pub batch_id:          Uuid,
  pub kind:              ImportKind,
  pub content_sha256:    String,
  #[serde(flatten)]
  pub counts:            ImportCounts,
  pub report:            ImportReport,
  /// URL reconciliation over the rows of the imported kind.
  pub urls:              DriftCounts,
  /// Region rows recomputed; 0 for water-data imports.
  pub regions_refreshed: usize,
}

pub fn content_sha256(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// Run the whole pipeline for an uploaded workbook.
pub async fn import_workbook<S: SchemeStore>(
  store: &S,
  config: &ServerConfig,
  aliases: &RegionAliases,
  kind: ImportKind,
  request: ImportRequest,
) -> Result<ImportSummary> {
  let hash = content_sha256(&request.bytes);

  if !request.force
    && let Some(previous) = store
      .find_import_by_hash(hash.clone())
      .await
      .map_err(Error::store)?
  {
    tracing::info!(%hash, batch_id = %previous.batch_id, "duplicate workbook refused");
    return Err(Error::DuplicateImport {
      batch_id:    previous.batch_id,
      imported_at: previous.imported_at,
    });
  }

  let opts = config.import.clone();
  let aliases = aliases.clone();
  let bytes = request.bytes;
  let parsed =
    tokio::task::spawn_blocking(move || ParsedWorkbook::parse(kind, &bytes, &opts, &aliases))
      .await??;

  if parsed.report().sheets.is_empty() {
    let reasons: Vec<String> = parsed
      .report()
      .skipped_sheets
      .iter()
      .map(|s| format!("{}: {}", s.sheet, s.reason))
      .collect();
    return Err(Error::BadRequest(format!(
      "no importable sheet found ({})",
      reasons.join("; ")
    )));
  }

  let meta = ImportMeta {
    file_name: request.file_name,
    content_sha256: hash,
    mode: request.mode,
  };
  persist(store, config, meta, parsed).await
}

/// Provenance of a parsed workbook.
#[derive(Debug, Clone)]
pub struct ImportMeta {
  pub file_name:      Option<String>,
  pub content_sha256: String,
  pub mode:           WriteMode,
}

/// Store parsed rows and bring derived data up to date.
pub async fn persist<S: SchemeStore>(
  store: &S,
  config: &ServerConfig,
  meta: ImportMeta,
  parsed: ParsedWorkbook,
) -> Result<ImportSummary> {
  let kind = parsed.kind();

  let (counts, report, urls, regions_refreshed) = match parsed {
    ParsedWorkbook::Schemes(Parsed { rows, report }) => {
      let counts = store
        .import_schemes(rows, meta.mode)
        .await
        .map_err(Error::store)?;
      let urls = repair::repair_scheme_urls(store, &config.dashboard, false).await?;
      let regions = store
        .refresh_region_summaries()
        .await
        .map_err(Error::store)?;
      (counts, report, urls, regions.len())
    }
    ParsedWorkbook::Water(Parsed { rows, report }) => {
      let counts = store
        .import_village_readings(rows, meta.mode)
        .await
        .map_err(Error::store)?;
      let urls = repair::repair_village_urls(store, &config.dashboard, false).await?;
      (counts, report, urls, 0)
    }
  };

  let batch = ImportBatch {
    batch_id: Uuid::new_v4(),
    kind,
    file_name: meta.file_name,
    content_sha256: meta.content_sha256,
    rows_read: report.rows_read() as u32,
    counts,
    invalid_rows: report.invalid_rows() as u32,
    imported_at: Utc::now(),
  };
  store
    .record_import(batch.clone())
    .await
    .map_err(Error::store)?;

  tracing::info!(
    batch_id = %batch.batch_id,
    %kind,
    file_name = batch.file_name.as_deref().unwrap_or("-"),
    rows_read = batch.rows_read,
    inserted = counts.inserted,
    updated = counts.updated,
    skipped = counts.skipped_duplicates,
    invalid = batch.invalid_rows,
    urls_written = urls.rewritten,
    "workbook imported"
  );

  Ok(ImportSummary {
    batch_id: batch.batch_id,
    kind,
    content_sha256: batch.content_sha256,
    counts,
    report,
    urls,
    regions_refreshed,
  })
}
