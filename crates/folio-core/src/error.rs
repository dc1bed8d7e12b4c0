//! Error types for `folio-core`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown chat role: {0:?}")]
  UnknownRole(String),

  #[error("failed to read resume from {path:?}: {source}")]
  ResumeIo {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
