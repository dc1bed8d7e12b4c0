//! `POST /api/contact`: append a submission to the contact log.

use axum::{Json, extract::State};
use folio_core::{contact::NewContact, store::HistoryStore};
use folio_relay::ChatUpstream;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

pub const ACKNOWLEDGEMENT: &str = "Message received! I'll get back to you soon.";

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
  pub name:    String,
  pub email:   String,
  pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
  pub status:  String,
  pub message: String,
}

pub async fn handler<S, U>(
  State(state): State<AppState<S, U>>,
  Json(body): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, ApiError>
where
  S: HistoryStore,
  U: ChatUpstream,
{
  state
    .store
    .append_contact(NewContact {
      name:    body.name,
      email:   body.email,
      message: body.message,
    })
    .await
    .map_err(|e| {
      tracing::error!(error = %e, "failed to record contact submission");
      ApiError::store(e)
    })?;

  Ok(Json(ContactResponse {
    status:  "success".to_owned(),
    message: ACKNOWLEDGEMENT.to_owned(),
  }))
}
