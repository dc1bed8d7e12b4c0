//! `GET /api/resume`: the static dataset, verbatim.

use axum::{Json, extract::State};
use folio_core::{resume::Resume, store::HistoryStore};
use folio_relay::ChatUpstream;

use crate::AppState;

pub async fn handler<S, U>(State(state): State<AppState<S, U>>) -> Json<Resume>
where
  S: HistoryStore,
  U: ChatUpstream,
{
  Json(state.resume.as_ref().clone())
}
