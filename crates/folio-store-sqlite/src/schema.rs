//! SQL schema for the Folio SQLite store.
//!
//! Executed on every open; each statement is a no-op when the object already
//! exists, so running it twice neither duplicates tables nor touches rows.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Both logs are strictly append-only.
-- No UPDATE or DELETE is ever issued against these tables.
CREATE TABLE IF NOT EXISTS chat_messages (
    turn_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id  TEXT NOT NULL,
    role        TEXT NOT NULL,   -- 'system' | 'user' | 'assistant'
    content     TEXT NOT NULL,
    recorded_at TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS contact_submissions (
    submission_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    message       TEXT NOT NULL,
    received_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS chat_messages_session_idx
    ON chat_messages(session_id, turn_id);

PRAGMA user_version = 1;
";
