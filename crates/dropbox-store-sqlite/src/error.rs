//! Error type for `dropbox-store-sqlite`.

use dropbox_core::AsDomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] dropbox_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl AsDomainError for Error {
  fn as_domain(&self) -> Option<&dropbox_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}
