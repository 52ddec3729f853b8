//! Header-row detection and column mapping.
//!
//! Report sheets usually open with a few title rows ("Scheme Status Report as
//! on …") before the real header, and the header wording drifts between
//! offices. Columns are therefore found by phrase matching on a normalised
//! header text rather than by position.

use crate::grid::Grid;

/// Lowercase, turn punctuation into spaces and collapse whitespace:
/// `"Sub-Division "` → `"sub division"`.
pub fn normalize_header(raw: &str) -> String {
  let spaced: String = raw
    .chars()
    .map(|c| if c.is_alphanumeric() { c } else { ' ' })
    .collect();
  spaced
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Whether `phrase` occurs in the normalised `header` on word boundaries.
pub fn contains_phrase(header: &str, phrase: &str) -> bool {
  format!(" {header} ").contains(&format!(" {phrase} "))
}

/// A field and the header phrases that identify its column.
pub type FieldAliases<F> = (F, &'static [&'static str]);

/// Field → column index for one header row.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap<F> {
  columns: Vec<(F, usize)>,
}

impl<F: Copy + PartialEq> ColumnMap<F> {
  /// Assign columns to fields in the order `fields` lists them; a column
  /// claimed by an earlier field is not offered to later ones. List the
  /// more specific fields first (`Sub Division` before `Division`).
  ///
  /// A field's phrases are tried in order too, so `"total villages"` finds
  /// its column even when a looser `"villages"` header sits further left.
  pub fn from_headers(headers: &[String], fields: &[FieldAliases<F>]) -> Self {
    let mut taken = vec![false; headers.len()];
    let mut columns = Vec::new();
    for (field, phrases) in fields {
      let hit = phrases.iter().find_map(|p| {
        headers
          .iter()
          .enumerate()
          .position(|(i, h)| !taken[i] && !h.is_empty() && contains_phrase(h, p))
      });
      if let Some(i) = hit {
        taken[i] = true;
        columns.push((*field, i));
      }
    }
    Self { columns }
  }

  pub fn get(&self, field: F) -> Option<usize> {
    self
      .columns
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, i)| *i)
  }

  pub fn contains(&self, field: F) -> bool { self.get(field).is_some() }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  /// Columns no field claimed.
  pub fn unclaimed(&self, width: usize) -> impl Iterator<Item = usize> + '_ {
    (0..width).filter(|i| !self.columns.iter().any(|(_, c)| c == i))
  }
}

/// Normalised header texts of one grid row.
pub fn header_texts(grid: &Grid, row: usize) -> Vec<String> {
  grid
    .row(row)
    .iter()
    .map(|c| c.text().map(|t| normalize_header(&t)).unwrap_or_default())
    .collect()
}

/// Scan the first `scan_rows` rows for the one that maps the most fields.
/// Ties go to the earliest row; fewer than `min_hits` mapped fields means
/// the sheet has no recognisable header.
pub fn find_header_row<F: Copy + PartialEq>(
  grid: &Grid,
  fields: &[FieldAliases<F>],
  min_hits: usize,
  scan_rows: usize,
) -> Option<(usize, ColumnMap<F>)> {
  let mut best: Option<(usize, ColumnMap<F>)> = None;
  for row in 0..grid.height().min(scan_rows) {
    let map = ColumnMap::from_headers(&header_texts(grid, row), fields);
    if map.len() >= min_hits && best.as_ref().is_none_or(|(_, b)| map.len() > b.len()) {
      best = Some((row, map));
    }
  }
  best
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, Copy, PartialEq)]
  enum F {
    SubDivision,
    Division,
    Block,
  }

  const FIELDS: &[FieldAliases<F>] = &[
    (F::SubDivision, &["sub division", "subdivision"]),
    (F::Division, &["division"]),
    (F::Block, &["block", "taluka"]),
  ];

  #[test]
  fn headers_normalise_punctuation_and_case() {
    assert_eq!(normalize_header("  Sub-Division\n(Name) "), "sub division name");
    assert!(contains_phrase("no of villages integrated", "villages integrated"));
    assert!(!contains_phrase("subdivision", "division"));
  }

  #[test]
  fn specific_fields_claim_columns_first() {
    let headers: Vec<String> = ["Division", "Sub Division", "Block"]
      .iter()
      .map(|h| normalize_header(h))
      .collect();
    let map = ColumnMap::from_headers(&headers, FIELDS);
    assert_eq!(map.get(F::SubDivision), Some(1));
    assert_eq!(map.get(F::Division), Some(0));
    assert_eq!(map.get(F::Block), Some(2));
    assert_eq!(map.unclaimed(4).collect::<Vec<_>>(), [3]);
  }

  #[test]
  fn earlier_phrases_outrank_header_position() {
    const VILLAGES: &[FieldAliases<F>] = &[(F::Block, &["total villages", "villages"])];
    let headers: Vec<String> = ["Balance Villages", "Total Villages"]
      .iter()
      .map(|h| normalize_header(h))
      .collect();
    assert_eq!(ColumnMap::from_headers(&headers, VILLAGES).get(F::Block), Some(1));

    let loose: Vec<String> = vec!["balance villages".into(), "esr".into()];
    assert_eq!(ColumnMap::from_headers(&loose, VILLAGES).get(F::Block), Some(0));
  }

  #[test]
  fn title_rows_are_skipped() {
    let grid = Grid::from_text(&[
      vec!["Scheme status report", "", ""],
      vec!["", "", ""],
      vec!["Division", "Sub-Division", "Taluka"],
      vec!["D1", "SD1", "B1"],
    ]);
    let (row, map) = find_header_row(&grid, FIELDS, 2, 20).unwrap();
    assert_eq!(row, 2);
    assert_eq!(map.len(), 3);
  }

  #[test]
  fn best_row_wins_and_ties_go_first() {
    let grid = Grid::from_text(&[
      vec!["Division", "Block", ""],
      vec!["Division", "Sub Division", "Block"],
      vec!["Division", "Sub Division", "Block"],
    ]);
    assert_eq!(find_header_row(&grid, FIELDS, 2, 20).unwrap().0, 1);
    assert_eq!(find_header_row(&grid, FIELDS, 2, 1).unwrap().0, 0);
    assert!(find_header_row(&grid, FIELDS, 4, 20).is_none());
  }
}
