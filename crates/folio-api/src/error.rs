//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The upstream credential is missing or still the placeholder.
  #[error("{0}")]
  Configuration(String),

  #[error("{0}")]
  RateLimited(String),

  #[error("AI service timeout, please try again.")]
  Timeout,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("{0}")]
  Upstream(String),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }
}

impl From<folio_relay::Error> for ApiError {
  fn from(e: folio_relay::Error) -> Self {
    match e {
      folio_relay::Error::RateLimitExhausted { last_error, .. } => ApiError::RateLimited(format!(
        "The AI service is rate-limiting requests. Please wait a few seconds and try again. \
         Last error: {last_error}"
      )),
      folio_relay::Error::UpstreamTimeout(_) => ApiError::Timeout,
      other => ApiError::Upstream(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
      ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "detail": self.to_string() }))).into_response()
  }
}
