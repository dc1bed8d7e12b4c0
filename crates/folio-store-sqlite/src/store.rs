//! [`SqliteStore`]: the SQLite implementation of [`HistoryStore`].

use std::path::Path;

use chrono::Utc;

use folio_core::{
  chat::{ChatTurn, Role},
  contact::{ContactSubmission, NewContact},
  store::HistoryStore,
};

use crate::{
  Result,
  encode::{RawTurn, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The chat and contact logs backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the connection's own thread, which serialises concurrent writes.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteStore {
  type Error = crate::Error;

  async fn init(&self) -> Result<()> {
    self.init_schema().await
  }

  // ── Chat log ──────────────────────────────────────────────────────────────

  async fn append_chat_turn(
    &self,
    session_id: &str,
    role:       Role,
    content:    &str,
  ) -> Result<ChatTurn> {
    let recorded_at = Utc::now();

    let session_str = session_id.to_owned();
    let role_str    = role.as_str();
    let content_str = content.to_owned();
    let at_str      = encode_dt(recorded_at);

    let turn_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chat_messages (session_id, role, content, recorded_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session_str, role_str, content_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ChatTurn {
      turn_id,
      session_id: session_id.to_owned(),
      role,
      content: content.to_owned(),
      recorded_at,
    })
  }

  async fn append_exchange(
    &self,
    session_id:      &str,
    user_message:    &str,
    assistant_reply: &str,
  ) -> Result<(ChatTurn, ChatTurn)> {
    let recorded_at = Utc::now();

    let session_str = session_id.to_owned();
    let user_str    = user_message.to_owned();
    let reply_str   = assistant_reply.to_owned();
    let at_str      = encode_dt(recorded_at);

    let (user_id, reply_id) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = [0_i64; 2];
        for (slot, (role, content)) in [(Role::User, &user_str), (Role::Assistant, &reply_str)]
          .into_iter()
          .enumerate()
        {
          tx.execute(
            "INSERT INTO chat_messages (session_id, role, content, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![session_str, role.as_str(), content, at_str],
          )?;
          ids[slot] = tx.last_insert_rowid();
        }
        tx.commit()?;
        Ok((ids[0], ids[1]))
      })
      .await?;

    let user = ChatTurn {
      turn_id:     user_id,
      session_id:  session_id.to_owned(),
      role:        Role::User,
      content:     user_message.to_owned(),
      recorded_at,
    };
    let assistant = ChatTurn {
      turn_id:     reply_id,
      session_id:  session_id.to_owned(),
      role:        Role::Assistant,
      content:     assistant_reply.to_owned(),
      recorded_at,
    };
    Ok((user, assistant))
  }

  async fn read_recent_turns(&self, session_id: &str, limit: usize) -> Result<Vec<ChatTurn>> {
    let session_str = session_id.to_owned();
    let limit_val   = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawTurn> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM chat_messages
           WHERE session_id = ?1
           ORDER BY turn_id DESC
           LIMIT ?2",
          RawTurn::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![session_str, limit_val], RawTurn::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Fetched newest-first; callers want the conversation in order.
    raws.into_iter().rev().map(RawTurn::into_turn).collect()
  }

  // ── Contact log ───────────────────────────────────────────────────────────

  async fn append_contact(&self, input: NewContact) -> Result<ContactSubmission> {
    let received_at = Utc::now();

    let name_str    = input.name.clone();
    let email_str   = input.email.clone();
    let message_str = input.message.clone();
    let at_str      = encode_dt(received_at);

    let submission_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contact_submissions (name, email, message, received_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name_str, email_str, message_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ContactSubmission {
      submission_id,
      name: input.name,
      email: input.email,
      message: input.message,
      received_at,
    })
  }

  async fn contact_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM contact_submissions", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn chat_turn_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM chat_messages", [], |r| r.get(0))?))
      .await?;
    Ok(count.max(0) as u64)
  }
}
