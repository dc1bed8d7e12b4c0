//! Outbound chat relay: multi-model fallback with bounded retry.
//!
//! [`Dispatcher`] walks a de-duplicated list of candidate models, retrying
//! each on rate limits with linear backoff, and returns the first reply. The
//! transport sits behind [`ChatUpstream`]; [`OpenRouterClient`] is the HTTP
//! implementation used in production.

pub mod candidates;
pub mod dispatcher;
pub mod error;
pub mod openrouter;
pub mod upstream;

pub use candidates::ModelCandidates;
pub use dispatcher::{AttemptOutcome, Dispatched, Dispatcher, ModelAttempt, RetryPolicy};
pub use error::{Error, Result};
pub use openrouter::{OpenRouterClient, OpenRouterConfig};
pub use upstream::{ChatUpstream, Completion};
