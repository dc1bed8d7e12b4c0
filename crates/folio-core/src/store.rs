//! The `HistoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `folio-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  chat::{ChatTurn, Role},
  contact::{ContactSubmission, NewContact},
};

/// Abstraction over the append-only chat and contact logs.
///
/// There are no update or delete operations: history is a write-once audit
/// trail. Implementations must serialise concurrent writes themselves.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Ensure both logs exist. Idempotent; safe to call on every start.
  fn init(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Chat log ──────────────────────────────────────────────────────────

  /// Append a single turn to `session_id`'s history.
  fn append_chat_turn<'a>(
    &'a self,
    session_id: &'a str,
    role: Role,
    content: &'a str,
  ) -> impl Future<Output = Result<ChatTurn, Self::Error>> + Send + 'a;

  /// Append a user message and the assistant's reply as one atomic unit.
  ///
  /// Either both turns are stored or neither is.
  fn append_exchange<'a>(
    &'a self,
    session_id: &'a str,
    user_message: &'a str,
    assistant_reply: &'a str,
  ) -> impl Future<Output = Result<(ChatTurn, ChatTurn), Self::Error>> + Send + 'a;

  /// Return up to `limit` of the most recent turns for `session_id`,
  /// oldest first. Unknown sessions yield an empty vector.
  fn read_recent_turns<'a>(
    &'a self,
    session_id: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ChatTurn>, Self::Error>> + Send + 'a;

  // ── Contact log ───────────────────────────────────────────────────────

  /// Append a contact-form submission.
  fn append_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<ContactSubmission, Self::Error>> + Send + '_;

  /// Number of contact submissions recorded so far.
  fn contact_count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of chat turns recorded so far, across every session.
  fn chat_turn_count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
