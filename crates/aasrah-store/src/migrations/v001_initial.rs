//! v001 -- Initial schema creation.
//!
//! Creates `local_storage` (string key/value pairs, the equivalent of the
//! browser's persistent storage) and `accounts` (the local demo account
//! registry).

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Local storage
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS local_storage (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL                 -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Local accounts (demo backend)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS accounts (
    uid           TEXT PRIMARY KEY NOT NULL, -- UUID v4
    email         TEXT NOT NULL UNIQUE,      -- lower-cased
    salt          TEXT NOT NULL,             -- hex-encoded 16 bytes
    password_hash TEXT NOT NULL,             -- hex-encoded BLAKE3 digest
    created_at    TEXT NOT NULL
);
"#;

pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
