//! An in-memory sheet: rows of loosely typed cells, plus the coercions the
//! report parsers need.

use chrono::NaiveDateTime;

use crate::error::CellError;

/// Text values the field offices use for "no data".
const MISSING_MARKERS: [&str; 5] = ["", "-", "na", "n/a", "nil"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Empty,
  Text(String),
  Number(f64),
  Bool(bool),
  Date(NaiveDateTime),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
  /// Empty, or text that only says the value is missing.
  pub fn is_blank(&self) -> bool {
    match self {
      Cell::Empty => true,
      Cell::Text(s) => MISSING_MARKERS.contains(&s.trim().to_lowercase().as_str()),
      _ => false,
    }
  }

  /// Trimmed display text; `None` for blank cells.
  ///
  /// Whole numbers are printed without a decimal point so numeric scheme ids
  /// read back the way they look in Excel.
  pub fn text(&self) -> Option<String> {
    if self.is_blank() {
      return None;
    }
    Some(match self {
      Cell::Empty => return None,
      Cell::Text(s) => s.trim().to_owned(),
      Cell::Number(n) => format_number(*n),
      Cell::Bool(b) => b.to_string(),
      Cell::Date(d) => d.format("%d-%m-%Y").to_string(),
    })
  }

  /// Like [`text`](Self::text) but text cells keep their original spacing.
  pub fn raw_text(&self) -> Option<String> {
    match self {
      Cell::Text(s) if !self.is_blank() => Some(s.clone()),
      other => other.text(),
    }
  }

  /// A numeric reading. Numeric text (`" 12.5 "`, `"1,200"`) is accepted.
  pub fn number(&self) -> Result<Option<f64>, CellError> {
    if self.is_blank() {
      return Ok(None);
    }
    match self {
      Cell::Number(n) => Ok(Some(*n)),
      Cell::Text(s) => s
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Some)
        .ok_or_else(|| CellError::NotANumber(s.trim().to_owned())),
      other => Err(CellError::NotANumber(other.text().unwrap_or_default())),
    }
  }

  /// A non-negative whole-number count.
  pub fn count(&self) -> Result<Option<u32>, CellError> {
    let Some(n) = self.number()? else {
      return Ok(None);
    };
    if n < 0.0 {
      return Err(CellError::Negative(n));
    }
    if n.fract() != 0.0 {
      return Err(CellError::Fractional(n));
    }
    if n > f64::from(u32::MAX) {
      return Err(CellError::OutOfRange(n));
    }
    Ok(Some(n as u32))
  }
}

fn format_number(n: f64) -> String {
  if n.fract() == 0.0 && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    n.to_string()
  }
}

impl From<&str> for Cell {
  fn from(s: &str) -> Self {
    if s.is_empty() { Cell::Empty } else { Cell::Text(s.to_owned()) }
  }
}

impl From<f64> for Cell {
  fn from(n: f64) -> Self { Cell::Number(n) }
}

/// A whole sheet. Rows may have different lengths; reads past the end of a
/// row yield [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
  rows: Vec<Vec<Cell>>,
}

impl Grid {
  pub fn new(rows: Vec<Vec<Cell>>) -> Self { Self { rows } }

  /// Build a grid from text, e.g. in tests. Empty strings become empty cells.
  pub fn from_text<R: AsRef<[&'static str]>>(rows: &[R]) -> Self {
    Self::new(
      rows
        .iter()
        .map(|r| r.as_ref().iter().map(|s| Cell::from(*s)).collect())
        .collect(),
    )
  }

  pub fn height(&self) -> usize { self.rows.len() }

  pub fn row(&self, index: usize) -> &[Cell] {
    self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn cell(&self, row: usize, col: usize) -> &Cell {
    self.row(row).get(col).unwrap_or(&EMPTY)
  }

  pub fn is_blank_row(&self, index: usize) -> bool {
    self.row(index).iter().all(Cell::is_blank)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_markers_are_blank() {
    for s in ["", "  ", "-", "NA", "n/a", "Nil"] {
      assert!(Cell::Text(s.into()).is_blank(), "{s:?}");
      assert_eq!(Cell::Text(s.into()).number(), Ok(None));
    }
    assert!(!Cell::Number(0.0).is_blank());
  }

  #[test]
  fn numbers_accept_numeric_text() {
    assert_eq!(Cell::Text(" 7 ".into()).count(), Ok(Some(7)));
    assert_eq!(Cell::Text("12.0".into()).count(), Ok(Some(12)));
    assert_eq!(Cell::Text("1,200".into()).count(), Ok(Some(1200)));
    assert_eq!(Cell::Text("55.5".into()).number(), Ok(Some(55.5)));
  }

  #[test]
  fn counts_reject_fractions_and_negatives() {
    assert_eq!(Cell::Number(2.5).count(), Err(CellError::Fractional(2.5)));
    assert_eq!(Cell::Number(-1.0).count(), Err(CellError::Negative(-1.0)));
    assert_eq!(
      Cell::Text("twelve".into()).count(),
      Err(CellError::NotANumber("twelve".into()))
    );
  }

  #[test]
  fn whole_numbers_print_without_decimals() {
    assert_eq!(Cell::Number(20018548.0).text().as_deref(), Some("20018548"));
    assert_eq!(Cell::Number(1.5).text().as_deref(), Some("1.5"));
    assert_eq!(Cell::Text("  Pune ".into()).text().as_deref(), Some("Pune"));
  }

  #[test]
  fn reads_past_the_edge_are_empty() {
    let grid = Grid::from_text(&[["a", "b"]]);
    assert_eq!(grid.cell(0, 1), &Cell::Text("b".into()));
    assert_eq!(grid.cell(0, 5), &Cell::Empty);
    assert_eq!(grid.cell(9, 0), &Cell::Empty);
    assert!(grid.is_blank_row(3));
  }
}
