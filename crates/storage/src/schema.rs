#![forbid(unsafe_code)]

use crate::StoreError;
use rusqlite::{Connection, params};

const SCHEMA_VERSION: &str = "tags_v1";

pub(crate) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tags (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          normalized_name TEXT NOT NULL UNIQUE,
          usage_count INTEGER NOT NULL DEFAULT 0,
          last_used_at_ms INTEGER,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS book_tags (
          book_id INTEGER NOT NULL,
          tag_id INTEGER NOT NULL REFERENCES tags(id),
          attached_at_ms INTEGER NOT NULL,
          PRIMARY KEY (book_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS list_entry_tags (
          user_id INTEGER NOT NULL,
          book_id INTEGER NOT NULL,
          tag_id INTEGER NOT NULL REFERENCES tags(id),
          attached_at_ms INTEGER NOT NULL,
          PRIMARY KEY (user_id, book_id, tag_id)
        );

        CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name);
        CREATE INDEX IF NOT EXISTS idx_book_tags_tag ON book_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_list_entry_tags_tag ON list_entry_tags(tag_id);
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;
    Ok(())
}
