//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; roles as their lowercase name.

use chrono::{DateTime, Utc};
use folio_core::chat::{ChatTurn, Role};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_role(s: &str) -> Result<Role> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read directly from a `chat_messages` row.
pub struct RawTurn {
  pub turn_id:     i64,
  pub session_id:  String,
  pub role:        String,
  pub content:     String,
  pub recorded_at: String,
}

impl RawTurn {
  pub const COLUMNS: &'static str = "turn_id, session_id, role, content, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      turn_id:     row.get(0)?,
      session_id:  row.get(1)?,
      role:        row.get(2)?,
      content:     row.get(3)?,
      recorded_at: row.get(4)?,
    })
  }

  pub fn into_turn(self) -> Result<ChatTurn> {
    Ok(ChatTurn {
      turn_id:     self.turn_id,
      session_id:  self.session_id,
      role:        decode_role(&self.role)?,
      content:     self.content,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
