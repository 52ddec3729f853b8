//! Error types for `jal-xlsx`.

use thiserror::Error;

/// Failure to read a workbook at all. Problems inside individual rows are
/// not errors; they are collected in the [`crate::ImportReport`].
#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot open workbook: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("cannot read sheet {sheet:?}: {source}")]
  Sheet {
    sheet:  String,
    #[source]
    source: calamine::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a single cell could not be coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
  #[error("expected a number, found {0:?}")]
  NotANumber(String),

  #[error("expected a whole number, found {0}")]
  Fractional(f64),

  #[error("negative value {0}")]
  Negative(f64),

  #[error("value {0} is out of range")]
  OutOfRange(f64),
}
