//! Error types for `jal-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A hierarchy segment needed to build a dashboard path is blank.
  #[error("incomplete hierarchy: {0} is blank")]
  IncompleteHierarchy(&'static str),

  #[error("invalid {field}: {message}")]
  Invalid {
    field:   &'static str,
    message: String,
  },
}

impl Error {
  pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
    Self::Invalid { field, message: message.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
