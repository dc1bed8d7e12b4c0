//! `POST /api/chat`: relay one message to the model and record the exchange.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | reply | `200 {response, session_id}` |
//! | no API key configured | `500` |
//! | every model rate-limited or failed | `429` |
//! | upstream call timed out | `504` |
//! | anything else, including a failed history write | `500` |

use axum::{Json, extract::State};
use folio_core::{chat::DEFAULT_SESSION, store::HistoryStore};
use folio_relay::ChatUpstream;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{AppState, error::ApiError};

pub const MISSING_KEY: &str =
  "OpenRouter API key not configured. Please set OPENROUTER_API_KEY in the environment or .env file.";

fn default_session() -> String {
  DEFAULT_SESSION.to_owned()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
  pub message:    String,
  #[serde(default = "default_session")]
  pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
  pub response:   String,
  pub session_id: String,
}

pub async fn handler<S, U>(
  State(state): State<AppState<S, U>>,
  Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError>
where
  S: HistoryStore,
  U: ChatUpstream,
{
  let relay = state
    .relay
    .as_ref()
    .ok_or_else(|| ApiError::Configuration(MISSING_KEY.to_owned()))?;

  let messages = state
    .prompt
    .for_session(state.store.as_ref(), &body.session_id, &body.message, state.history_limit)
    .await
    .map_err(|e| {
      error!(session_id = %body.session_id, error = %e, "failed to read chat history");
      ApiError::store(e)
    })?;

  let dispatched = relay.dispatch(&messages).await?;

  // The exchange is only recorded once the model has answered. If this write
  // fails the reply is dropped and the caller sees a 500.
  state
    .store
    .append_exchange(&body.session_id, &body.message, &dispatched.reply)
    .await
    .map_err(|e| {
      error!(
        session_id = %body.session_id,
        model = %dispatched.model,
        error = %e,
        "failed to persist chat exchange"
      );
      ApiError::store(e)
    })?;

  info!(
    session_id = %body.session_id,
    model = %dispatched.model,
    attempts = dispatched.attempts.len(),
    "chat exchange recorded"
  );

  Ok(Json(ChatResponse {
    response:   dispatched.reply,
    session_id: body.session_id,
  }))
}
