//! Error type for `folio-relay`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Every candidate model was rate-limited or failed.
  #[error("all candidate models exhausted after {attempts} attempts; last error: {last_error}")]
  RateLimitExhausted {
    last_error: String,
    attempts:   usize,
  },

  /// A single upstream call exceeded the per-call timeout. Not retried.
  #[error("upstream request timed out after {0:?}")]
  UpstreamTimeout(Duration),

  #[error("upstream transport error: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("malformed upstream response: {0}")]
  MalformedResponse(String),

  #[error("no candidate models configured")]
  NoCandidates,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
