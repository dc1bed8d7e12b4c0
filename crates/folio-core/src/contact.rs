//! Contact-form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for [`HistoryStore::append_contact`](crate::store::HistoryStore::append_contact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
  pub name:    String,
  pub email:   String,
  pub message: String,
}

/// A persisted contact submission. Write-only from the service's point of
/// view: nothing reads these back over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
  pub submission_id: i64,
  pub name:          String,
  pub email:         String,
  pub message:       String,
  pub received_at:   DateTime<Utc>,
}
