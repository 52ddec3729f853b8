//! What an import saw: per-sheet tallies and row-level problems.

use serde::{Deserialize, Serialize};

/// A data row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
  pub sheet:   String,
  /// 1-based, as Excel numbers rows.
  pub row:     usize,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetReport {
  pub sheet:        String,
  /// 1-based row of the detected header.
  pub header_row:   usize,
  /// Non-blank rows below the header.
  pub rows_read:    usize,
  pub valid_rows:   usize,
  /// Total/trailer rows that were recognised and ignored.
  pub skipped_rows: usize,
  pub errors:       Vec<RowError>,
}

/// A sheet that was not imported at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSheet {
  pub sheet:  String,
  pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
  pub sheets:         Vec<SheetReport>,
  pub skipped_sheets: Vec<SkippedSheet>,
}

impl ImportReport {
  pub fn rows_read(&self) -> usize { self.sheets.iter().map(|s| s.rows_read).sum() }

  pub fn valid_rows(&self) -> usize { self.sheets.iter().map(|s| s.valid_rows).sum() }

  pub fn invalid_rows(&self) -> usize { self.sheets.iter().map(|s| s.errors.len()).sum() }

  pub fn errors(&self) -> impl Iterator<Item = &RowError> {
    self.sheets.iter().flat_map(|s| s.errors.iter())
  }
}

/// Records parsed from a workbook, with the report describing the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
  pub rows:   Vec<T>,
  pub report: ImportReport,
}
