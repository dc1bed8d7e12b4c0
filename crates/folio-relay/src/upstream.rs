//! The seam between the dispatcher and the chat-completion transport.

use std::future::Future;

use folio_core::chat::ChatMessage;

use crate::Result;

/// Classified result of one upstream call that got an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
  /// 200: the assistant's reply text.
  Reply(String),
  /// 429: transient, worth retrying the same model.
  RateLimited { detail: String },
  /// Any other status: give up on this model.
  Failed { status: u16, detail: String },
}

/// A chat-completion service reachable by model identifier.
///
/// Implementations return `Err` only for conditions that should abort the
/// whole dispatch (timeouts, transport failures, unparseable success bodies);
/// HTTP-level failures are reported through [`Completion`].
pub trait ChatUpstream: Send + Sync {
  fn complete<'a>(
    &'a self,
    model: &'a str,
    messages: &'a [ChatMessage],
  ) -> impl Future<Output = Result<Completion>> + Send + 'a;
}
