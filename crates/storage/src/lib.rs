#![forbid(unsafe_code)]

mod attachments;
mod error;
mod requests;
mod schema;
mod tags;

pub use error::StoreError;
pub use requests::*;
pub use tags::SqliteTags;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tbr_core::TagConfig;

const DB_FILE_NAME: &str = "tbr_tags.db";

/// SQLite-backed home of the tag corpus and its attachments.
///
/// Owns the connection and the tag config; every batch operation runs in
/// its own transaction.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    config: TagConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(storage_dir, TagConfig::default())
    }

    pub fn open_with_config(
        storage_dir: impl AsRef<Path>,
        config: TagConfig,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::install_schema(&conn)?;

        tracing::info!(path = %db_path.display(), "tag store opened");
        Ok(Self {
            conn,
            storage_dir,
            config,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(DB_FILE_NAME)
    }

    pub fn config(&self) -> &TagConfig {
        &self.config
    }
}

/// Write transaction that takes the database write lock up front. A
/// concurrent writer waits on the busy timeout and then reads a corpus that
/// already holds everything committed before it.
pub(crate) fn write_tx(conn: &mut Connection) -> rusqlite::Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
}
