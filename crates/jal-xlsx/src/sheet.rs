//! The sheet-walking loop shared by every report layout.

use jal_core::hierarchy::RegionAliases;
use serde::{Deserialize, Serialize};

use crate::{
  grid::Grid,
  header::{ColumnMap, FieldAliases, contains_phrase, find_header_row, normalize_header},
  report::{ImportReport, Parsed, RowError, SheetReport, SkippedSheet},
};

/// Tuning for header detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
  /// How many rows from the top to search for the header.
  pub header_scan_rows: usize,
  /// Minimum number of recognised columns for a row to count as a header.
  pub min_header_hits:  usize,
}

impl Default for ImportOptions {
  fn default() -> Self { Self { header_scan_rows: 20, min_header_hits: 3 } }
}

/// One report layout: which columns to look for and how to read a row.
pub(crate) trait SheetLayout: Sized {
  type Field: Copy + PartialEq + 'static;
  type Row;

  /// Most specific fields first; see [`ColumnMap::from_headers`].
  const FIELDS: &'static [FieldAliases<Self::Field>];
  /// Fields without which a sheet is skipped, with a label for the reason.
  const REQUIRED: &'static [(Self::Field, &'static str)];

  fn new(
    sheet: &str,
    grid: &Grid,
    header_row: usize,
    columns: ColumnMap<Self::Field>,
    aliases: &RegionAliases,
  ) -> Self;

  /// `Ok(None)` for rows that are recognised but carry no record (totals).
  fn parse_row(&self, grid: &Grid, row: usize) -> Result<Option<Self::Row>, String>;
}

pub(crate) fn parse_sheets<L: SheetLayout>(
  sheets: &[(String, Grid)],
  opts: &ImportOptions,
  aliases: &RegionAliases,
) -> Parsed<L::Row> {
  let mut rows = Vec::new();
  let mut report = ImportReport::default();

  for (name, grid) in sheets {
    let skip = |reason: String| SkippedSheet { sheet: name.clone(), reason };

    let Some((header_row, columns)) =
      find_header_row(grid, L::FIELDS, opts.min_header_hits, opts.header_scan_rows)
    else {
      tracing::debug!(sheet = %name, "no header row found");
      report.skipped_sheets.push(skip("no recognisable header row".into()));
      continue;
    };
    if let Some((_, label)) = L::REQUIRED.iter().find(|(f, _)| !columns.contains(*f)) {
      tracing::debug!(sheet = %name, missing = label, "required column missing");
      report.skipped_sheets.push(skip(format!("no {label} column")));
      continue;
    }

    let layout = L::new(name, grid, header_row, columns, aliases);
    let mut sheet = SheetReport {
      sheet:        name.clone(),
      header_row:   header_row + 1,
      rows_read:    0,
      valid_rows:   0,
      skipped_rows: 0,
      errors:       Vec::new(),
    };

    for row in header_row + 1..grid.height() {
      if grid.is_blank_row(row) {
        continue;
      }
      sheet.rows_read += 1;
      match layout.parse_row(grid, row) {
        Ok(Some(record)) => {
          rows.push(record);
          sheet.valid_rows += 1;
        }
        Ok(None) => sheet.skipped_rows += 1,
        Err(message) => sheet.errors.push(RowError {
          sheet: name.clone(),
          row: row + 1,
          message,
        }),
      }
    }

    tracing::debug!(
      sheet = %name,
      header_row = sheet.header_row,
      rows_read = sheet.rows_read,
      valid = sheet.valid_rows,
      invalid = sheet.errors.len(),
      "sheet parsed"
    );
    report.sheets.push(sheet);
  }

  Parsed { rows, report }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

pub(crate) fn text_at(grid: &Grid, row: usize, col: Option<usize>) -> Option<String> {
  col.and_then(|c| grid.cell(row, c).text())
}

/// Hierarchy segments keep their spacing until normalisation records it.
pub(crate) fn raw_text_at(grid: &Grid, row: usize, col: Option<usize>) -> Option<String> {
  col.and_then(|c| grid.cell(row, c).raw_text())
}

/// A count column; a missing column or blank cell reads as 0.
pub(crate) fn count_at(
  grid: &Grid,
  row: usize,
  col: Option<usize>,
  label: &str,
) -> Result<u32, String> {
  let Some(c) = col else { return Ok(0) };
  grid
    .cell(row, c)
    .count()
    .map(Option::unwrap_or_default)
    .map_err(|e| format!("{label}: {e}"))
}

pub(crate) fn optional_count_at(
  grid: &Grid,
  row: usize,
  col: Option<usize>,
  label: &str,
) -> Result<Option<u32>, String> {
  let Some(c) = col else { return Ok(None) };
  grid.cell(row, c).count().map_err(|e| format!("{label}: {e}"))
}

/// Subtotal and grand-total rows: some text cell says "total".
pub(crate) fn is_total_row(grid: &Grid, row: usize) -> bool {
  grid
    .row(row)
    .iter()
    .filter_map(|c| c.text())
    .any(|t| contains_phrase(&normalize_header(&t), "total"))
}

/// The region of a row: its own cell, else the sheet name when that is a
/// known region (reports are often split into one sheet per region).
pub(crate) fn sheet_region(sheet: &str, aliases: &RegionAliases) -> Option<String> {
  aliases.lookup(sheet).map(str::to_owned)
}
