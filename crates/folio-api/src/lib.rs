//! JSON HTTP surface for Folio.
//!
//! Exposes an axum [`Router`] backed by any [`HistoryStore`] and any
//! [`ChatUpstream`]. The binary in `main.rs` wires in the SQLite store and
//! the OpenRouter client.
//!
//! | Method | Path |
//! |--------|------|
//! | `POST` | `/api/chat` |
//! | `POST` | `/api/contact` |
//! | `GET`  | `/api/resume` |
//! | `GET`  | `/api/health` |

pub mod config;
pub mod error;
pub mod handlers;

pub use config::{ServerConfig, UpstreamSettings};
pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use folio_core::{prompt::PromptAssembler, resume::Resume, store::HistoryStore};
use folio_relay::{ChatUpstream, Dispatcher};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// Everything here is built once at startup and never mutated.
pub struct AppState<S, U> {
  pub store:         Arc<S>,
  /// `None` when no upstream credential is configured; chat then fails fast.
  pub relay:         Option<Arc<Dispatcher<U>>>,
  pub prompt:        Arc<PromptAssembler>,
  pub resume:        Arc<Resume>,
  pub history_limit: usize,
}

impl<S, U> Clone for AppState<S, U> {
  fn clone(&self) -> Self {
    Self {
      store:         Arc::clone(&self.store),
      relay:         self.relay.clone(),
      prompt:        Arc::clone(&self.prompt),
      resume:        Arc::clone(&self.resume),
      history_limit: self.history_limit,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S, U>(state: AppState<S, U>) -> Router
where
  S: HistoryStore + 'static,
  U: ChatUpstream + 'static,
{
  Router::new()
    .route("/api/chat", post(handlers::chat::handler::<S, U>))
    .route("/api/contact", post(handlers::contact::handler::<S, U>))
    .route("/api/resume", get(handlers::resume::handler::<S, U>))
    .route("/api/health", get(handlers::health::handler))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{collections::VecDeque, sync::Mutex, time::Duration};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use folio_core::{
    chat::{ChatMessage, ChatTurn, Role},
    contact::{ContactSubmission, NewContact},
  };
  use folio_relay::{Completion, ModelCandidates, RetryPolicy};
  use folio_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  // ── Fakes ───────────────────────────────────────────────────────────────────

  enum Scripted {
    Answer(Completion),
    Hang,
  }

  /// Upstream that replays canned outcomes and remembers every prompt.
  #[derive(Default)]
  struct FakeUpstream {
    script: Mutex<VecDeque<Scripted>>,
    seen:   Mutex<Vec<(String, Vec<ChatMessage>)>>,
  }

  impl FakeUpstream {
    fn new(script: Vec<Scripted>) -> Self {
      Self { script: Mutex::new(script.into()), seen: Mutex::default() }
    }

    fn calls(&self) -> usize {
      self.seen.lock().unwrap().len()
    }
  }

  impl ChatUpstream for FakeUpstream {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> folio_relay::Result<Completion> {
      self.seen.lock().unwrap().push((model.to_owned(), messages.to_vec()));
      let next = self.script.lock().unwrap().pop_front();
      match next {
        Some(Scripted::Answer(c)) => Ok(c),
        Some(Scripted::Hang) => std::future::pending().await,
        None => Ok(Completion::Failed { status: 500, detail: "unscripted".into() }),
      }
    }
  }

  #[derive(Debug, thiserror::Error)]
  #[error("disk full")]
  struct DiskFull;

  /// Store whose reads succeed empty and whose writes always fail.
  struct ReadOnlyStore;

  impl HistoryStore for ReadOnlyStore {
    type Error = DiskFull;

    async fn init(&self) -> Result<(), DiskFull> {
      Ok(())
    }

    async fn append_chat_turn(&self, _: &str, _: Role, _: &str) -> Result<ChatTurn, DiskFull> {
      Err(DiskFull)
    }

    async fn append_exchange(&self, _: &str, _: &str, _: &str) -> Result<(ChatTurn, ChatTurn), DiskFull> {
      Err(DiskFull)
    }

    async fn read_recent_turns(&self, _: &str, _: usize) -> Result<Vec<ChatTurn>, DiskFull> {
      Ok(Vec::new())
    }

    async fn append_contact(&self, _: NewContact) -> Result<ContactSubmission, DiskFull> {
      Err(DiskFull)
    }

    async fn contact_count(&self) -> Result<u64, DiskFull> {
      Ok(0)
    }

    async fn chat_turn_count(&self) -> Result<u64, DiskFull> {
      Ok(0)
    }
  }

  // ── Helpers ─────────────────────────────────────────────────────────────────

  fn reply(text: &str) -> Scripted {
    Scripted::Answer(Completion::Reply(text.to_owned()))
  }

  fn rate_limited() -> Scripted {
    Scripted::Answer(Completion::RateLimited { detail: "slow down".into() })
  }

  fn fast_policy() -> RetryPolicy {
    RetryPolicy {
      max_retries:  2,
      backoff_step: Duration::from_millis(1),
      call_timeout: Duration::from_millis(200),
    }
  }

  fn make_state<S: HistoryStore>(
    store: S,
    upstream: Option<FakeUpstream>,
  ) -> AppState<S, FakeUpstream> {
    let resume = Resume::embedded().unwrap();
    let relay = upstream.map(|u| {
      let candidates = ModelCandidates::new("primary", ["backup"]).unwrap();
      Arc::new(Dispatcher::new(u, candidates, fast_policy()))
    });
    AppState {
      store:         Arc::new(store),
      relay,
      prompt:        Arc::new(PromptAssembler::new(&resume).unwrap()),
      resume:        Arc::new(resume),
      history_limit: 10,
    }
  }

  async fn sqlite_state(upstream: Option<FakeUpstream>) -> AppState<SqliteStore, FakeUpstream> {
    make_state(SqliteStore::open_in_memory().await.unwrap(), upstream)
  }

  async fn send<S: HistoryStore + 'static>(
    state: AppState<S, FakeUpstream>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp   = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json   = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
  }

  fn upstream_of<S>(state: &AppState<S, FakeUpstream>) -> &FakeUpstream {
    state.relay.as_ref().unwrap().upstream()
  }

  // ── Health / resume ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_is_always_healthy() {
    let state = sqlite_state(None).await;
    let (status, body) = send(state, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
  }

  #[tokio::test]
  async fn resume_is_returned_verbatim() {
    let state = sqlite_state(None).await;
    let (status, body) = send(state, "GET", "/api/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body, Resume::embedded().unwrap().as_value());
  }

  // ── Chat ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chat_success_records_both_turns() {
    let state = sqlite_state(Some(FakeUpstream::new(vec![reply("Hi, I'm Alex's assistant.")]))).await;

    let (status, body) = send(
      state.clone(),
      "POST",
      "/api/chat",
      Some(json!({ "message": "hello", "session_id": "s1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Hi, I'm Alex's assistant.", "session_id": "s1" }));

    let turns = state.store.read_recent_turns("s1", 10).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!((turns[0].role, turns[0].content.as_str()), (Role::User, "hello"));
    assert_eq!(
      (turns[1].role, turns[1].content.as_str()),
      (Role::Assistant, "Hi, I'm Alex's assistant.")
    );
    assert_eq!(upstream_of(&state).seen.lock().unwrap()[0].0, "primary");
    assert_eq!(state.store.chat_turn_count().await.unwrap(), 2);
  }

  #[tokio::test]
  async fn chat_defaults_session_id() {
    let state = sqlite_state(Some(FakeUpstream::new(vec![reply("ok")]))).await;

    let (status, body) =
      send(state.clone(), "POST", "/api/chat", Some(json!({ "message": "hello" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "default");
    assert_eq!(state.store.read_recent_turns("default", 10).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn second_chat_sees_prior_history() {
    let state = sqlite_state(Some(FakeUpstream::new(vec![reply("a1"), reply("a2")]))).await;

    send(state.clone(), "POST", "/api/chat", Some(json!({ "message": "q1", "session_id": "s" }))).await;
    send(state.clone(), "POST", "/api/chat", Some(json!({ "message": "q2", "session_id": "s" }))).await;

    let seen = upstream_of(&state).seen.lock().unwrap().clone();
    let second = &seen[1].1;
    let tail: Vec<_> = second.iter().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(second[0].role, Role::System);
    assert_eq!(&tail[1..], &[
      (Role::User, "q1"),
      (Role::Assistant, "a1"),
      (Role::User, "q2"),
    ]);
  }

  #[tokio::test]
  async fn missing_credential_fails_without_side_effects() {
    let state = sqlite_state(None).await;

    let (status, body) = send(
      state.clone(),
      "POST",
      "/api/chat",
      Some(json!({ "message": "hello", "session_id": "s1" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("OPENROUTER_API_KEY"));
    assert_eq!(state.store.chat_turn_count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn exhausted_rate_limits_return_429_with_reason() {
    let script = (0..4).map(|_| rate_limited()).collect();
    let state = sqlite_state(Some(FakeUpstream::new(script))).await;

    let (status, body) =
      send(state.clone(), "POST", "/api/chat", Some(json!({ "message": "hi", "session_id": "s1" }))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let detail = body["detail"].as_str().unwrap();
    assert!(
      detail.contains("Last error: Rate limited (429) on model backup, attempt 2"),
      "detail: {detail}"
    );
    assert_eq!(upstream_of(&state).calls(), 4);
    assert_eq!(state.store.chat_turn_count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn failing_models_also_surface_as_429() {
    let script = vec![
      Scripted::Answer(Completion::Failed { status: 500, detail: "down".into() }),
      Scripted::Answer(Completion::Failed { status: 502, detail: "bad gateway".into() }),
    ];
    let state = sqlite_state(Some(FakeUpstream::new(script))).await;

    let (status, body) =
      send(state.clone(), "POST", "/api/chat", Some(json!({ "message": "hi" }))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["detail"].as_str().unwrap().contains("AI service error (502): bad gateway"));
    assert_eq!(upstream_of(&state).calls(), 2);
  }

  #[tokio::test]
  async fn upstream_timeout_returns_504() {
    let state = sqlite_state(Some(FakeUpstream::new(vec![Scripted::Hang, reply("late")]))).await;

    let (status, _) =
      send(state.clone(), "POST", "/api/chat", Some(json!({ "message": "hi", "session_id": "s1" }))).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(upstream_of(&state).calls(), 1);
    assert_eq!(state.store.chat_turn_count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn failed_persistence_fails_the_request() {
    let state = make_state(ReadOnlyStore, Some(FakeUpstream::new(vec![reply("lost")])));

    let (status, body) =
      send(state.clone(), "POST", "/api/chat", Some(json!({ "message": "hi" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("disk full"));
    assert_eq!(upstream_of(&state).calls(), 1);
  }

  #[tokio::test]
  async fn chat_without_message_is_rejected() {
    let state = sqlite_state(Some(FakeUpstream::new(vec![reply("never")]))).await;

    let (status, _) =
      send(state.clone(), "POST", "/api/chat", Some(json!({ "session_id": "s1" }))).await;

    assert!(status.is_client_error(), "status: {status}");
    assert_eq!(upstream_of(&state).calls(), 0);
  }

  // ── Contact ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn contact_records_one_submission_only() {
    let state = sqlite_state(None).await;

    let (status, body) = send(
      state.clone(),
      "POST",
      "/api/contact",
      Some(json!({ "name": "Jane", "email": "jane@x.com", "message": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({
      "status": "success",
      "message": "Message received! I'll get back to you soon.",
    }));
    assert_eq!(state.store.contact_count().await.unwrap(), 1);
    assert_eq!(state.store.chat_turn_count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn contact_storage_failure_returns_500() {
    let state = make_state(ReadOnlyStore, None);

    let (status, body) = send(
      state,
      "POST",
      "/api/contact",
      Some(json!({ "name": "Jane", "email": "jane@x.com", "message": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("disk full"));
  }
}
