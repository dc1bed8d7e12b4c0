//! Multi-model fallback with per-model retry on rate limits.
//!
//! For each candidate, in order:
//!
//! | Upstream outcome | Action |
//! |------------------|--------|
//! | reply            | return it immediately |
//! | 429              | sleep `backoff_step * attempt`, retry the same model (up to `max_retries`) |
//! | other status     | move on to the next model, no retry |
//! | timeout / transport / malformed body | abort the whole dispatch |
//!
//! When every candidate is used up the dispatch fails with
//! [`Error::RateLimitExhausted`] carrying the last recorded reason.

use std::time::Duration;

use folio_core::chat::ChatMessage;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  candidates::ModelCandidates,
  upstream::{ChatUpstream, Completion},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Bounds on how hard a single dispatch tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Calls per model before falling through to the next one.
  pub max_retries:  u32,
  /// Linear backoff unit: attempt `n` waits `n * backoff_step`.
  pub backoff_step: Duration,
  /// Ceiling on each individual upstream call.
  pub call_timeout: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries:  3,
      backoff_step: Duration::from_secs(3),
      call_timeout: Duration::from_secs(60),
    }
  }
}

impl RetryPolicy {
  /// Delay after a rate limit on the 1-indexed `attempt`. Saturates at
  /// [`Duration::MAX`].
  pub fn backoff_for(&self, attempt: u32) -> Duration {
    self.backoff_step.checked_mul(attempt).unwrap_or(Duration::MAX)
  }
}

// ─── Attempt log ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
  Success,
  RateLimited { backoff: Duration },
  Failed { status: u16 },
}

/// One upstream call made during a dispatch. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAttempt {
  pub model:   String,
  pub attempt: u32,
  pub outcome: AttemptOutcome,
}

/// A successful dispatch.
#[derive(Debug, Clone)]
pub struct Dispatched {
  pub model:    String,
  pub reply:    String,
  pub attempts: Vec<ModelAttempt>,
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// Delivers one prompt to the upstream service with bounded resilience.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct Dispatcher<U> {
  upstream:   U,
  candidates: ModelCandidates,
  policy:     RetryPolicy,
}

impl<U: ChatUpstream> Dispatcher<U> {
  pub fn new(upstream: U, candidates: ModelCandidates, policy: RetryPolicy) -> Self {
    Self { upstream, candidates, policy }
  }

  pub fn upstream(&self) -> &U {
    &self.upstream
  }

  pub fn candidates(&self) -> &ModelCandidates {
    &self.candidates
  }

  /// Send `messages` to the first candidate that answers.
  ///
  /// Has no side effects beyond the upstream calls; persisting the exchange is
  /// the caller's job.
  pub async fn dispatch(&self, messages: &[ChatMessage]) -> Result<Dispatched> {
    let mut attempts: Vec<ModelAttempt> = Vec::new();
    let mut last_error = String::new();

    for model in self.candidates.iter() {
      for attempt in 1..=self.policy.max_retries.max(1) {
        debug!(model, attempt, messages = messages.len(), "sending chat completion");

        let completion = match tokio::time::timeout(
          self.policy.call_timeout,
          self.upstream.complete(model, messages),
        )
        .await
        {
          Ok(Ok(c)) => c,
          Ok(Err(e)) => {
            warn!(model, attempt, error = %e, "upstream call aborted the dispatch");
            return Err(e);
          }
          Err(_) => {
            warn!(model, attempt, timeout = ?self.policy.call_timeout, "upstream call timed out");
            return Err(Error::UpstreamTimeout(self.policy.call_timeout));
          }
        };

        match completion {
          Completion::Reply(reply) => {
            attempts.push(ModelAttempt {
              model:   model.to_owned(),
              attempt,
              outcome: AttemptOutcome::Success,
            });
            info!(model, attempt, total_attempts = attempts.len(), "chat completion succeeded");
            return Ok(Dispatched { model: model.to_owned(), reply, attempts });
          }
          Completion::RateLimited { detail } => {
            let backoff = self.policy.backoff_for(attempt);
            last_error = format!("Rate limited (429) on model {model}, attempt {attempt}");
            warn!(
              model,
              attempt,
              status = 429,
              backoff = ?backoff,
              %detail,
              "rate limited, retrying after backoff"
            );
            attempts.push(ModelAttempt {
              model:   model.to_owned(),
              attempt,
              outcome: AttemptOutcome::RateLimited { backoff },
            });
            tokio::time::sleep(backoff).await;
          }
          Completion::Failed { status, detail } => {
            last_error = format!("AI service error ({status}): {detail}");
            warn!(model, attempt, status, %detail, "upstream error, trying next model");
            attempts.push(ModelAttempt {
              model:   model.to_owned(),
              attempt,
              outcome: AttemptOutcome::Failed { status },
            });
            break;
          }
        }
      }
    }

    warn!(attempts = attempts.len(), %last_error, "all candidate models exhausted");
    Err(Error::RateLimitExhausted { last_error, attempts: attempts.len() })
  }
}
