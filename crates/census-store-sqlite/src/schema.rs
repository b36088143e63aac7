//! SQL schema for the census SQLite store.
//!
//! Executed once per store through the lifecycle gate. Every statement is
//! `IF NOT EXISTS`, so running it against an existing file changes nothing.

use crate::Result;

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS households (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name     TEXT NOT NULL,
    middle_name    TEXT,
    last_name      TEXT NOT NULL,
    extension      TEXT,
    house_no       TEXT,
    street_name    TEXT,
    barangay       TEXT,
    town           TEXT,
    province       TEXT,
    region         TEXT,
    zip_code       TEXT,
    contact_number TEXT,
    email_address  TEXT,
    created_at     TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at     TEXT NOT NULL
);

-- Member counts are never stored; they are aggregated from this table.
CREATE TABLE IF NOT EXISTS family_members (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    household_id INTEGER NOT NULL REFERENCES households(id) ON DELETE CASCADE,
    first_name   TEXT NOT NULL,
    last_name    TEXT NOT NULL,
    relationship TEXT NOT NULL,     -- lowercase Relationship name
    age          INTEGER,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_households_name
    ON households(last_name, first_name);
CREATE INDEX IF NOT EXISTS idx_family_members_household
    ON family_members(household_id);

PRAGMA user_version = 1;
";

/// Create the tables and indexes if they are missing.
pub async fn ensure_ready(conn: &tokio_rusqlite::Connection) -> Result<()> {
  conn
    .call(|conn| {
      conn.execute_batch(SCHEMA)?;
      Ok(())
    })
    .await?;
  Ok(())
}
