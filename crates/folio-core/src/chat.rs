//! Chat turns and the messages exchanged with the upstream model.
//!
//! A [`ChatTurn`] is one persisted row of a session's history. A
//! [`ChatMessage`] is the `{role, content}` pair the upstream service
//! consumes; turns are projected into messages when a prompt is assembled.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Session used when the client does not supply one.
pub const DEFAULT_SESSION: &str = "default";

/// Number of trailing turns fed back to the model when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::System    => "system",
      Role::User      => "user",
      Role::Assistant => "assistant",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "system"    => Ok(Role::System),
      "user"      => Ok(Role::User),
      "assistant" => Ok(Role::Assistant),
      other       => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

/// One persisted message in a session's history.
///
/// Turns are append-only: once written they are never updated or deleted.
/// `turn_id` is assigned by the store and increases with every insertion, so
/// ordering by it reproduces the conversation exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
  pub turn_id:     i64,
  pub session_id:  String,
  pub role:        Role,
  pub content:     String,
  pub recorded_at: DateTime<Utc>,
}

/// A single `{role, content}` entry of an upstream prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role:    Role,
  pub content: String,
}

impl ChatMessage {
  pub fn new(role: Role, content: impl Into<String>) -> Self {
    Self { role, content: content.into() }
  }

  pub fn system(content: impl Into<String>) -> Self {
    Self::new(Role::System, content)
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self::new(Role::User, content)
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self::new(Role::Assistant, content)
  }
}

impl From<ChatTurn> for ChatMessage {
  fn from(turn: ChatTurn) -> Self {
    Self { role: turn.role, content: turn.content }
  }
}
