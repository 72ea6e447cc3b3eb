//! SQLite-backed storage for lexdrill.
//!
//! One database file holds both partitions:
//! - `progress`: one row per word (degree, last review as Unix seconds)
//! - `collections` / `collection_members`: named word sets
//!
//! Every mutation runs in an immediate transaction, so a crash between two
//! writes never leaves a record half written. A second process that cannot
//! take the write lock within [`LOCK_TIMEOUT`] gets `LockTimeout`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::debug;

use crate::core::WordProgress;
use crate::error::{DrillError, Result};
use crate::storage::{CollectionStore, ProgressStore};

/// How long to wait for another writer before giving up.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS progress (
    word TEXT PRIMARY KEY NOT NULL,
    degree INTEGER NOT NULL,
    last_reviewed_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS collection_members (
    collection TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
    word TEXT NOT NULL,
    PRIMARY KEY (collection, word)
);
"#;

/// Progress and collection store backed by a single SQLite file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    /// `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| DrillError::storage(parent, e))?;
            }
        }

        let conn = Connection::open(&path)?;
        let store = Self::init(conn, Some(path))?;
        debug!(path = ?store.path, "opened progress database");
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(LOCK_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file location, if on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DrillError::database("database connection lock poisoned"))
    }
}

fn row_to_progress(row: &rusqlite::Row<'_>) -> rusqlite::Result<WordProgress> {
    let word: String = row.get(0)?;
    let degree: u32 = row.get(1)?;
    let last_reviewed: i64 = row.get(2)?;
    Ok(WordProgress::from_parts(word, degree, last_reviewed))
}

impl ProgressStore for SqliteStore {
    fn find(&self, word: &str) -> Result<Option<WordProgress>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT word, degree, last_reviewed_at FROM progress WHERE word = ?1",
                params![word],
                row_to_progress,
            )
            .optional()?;
        Ok(record)
    }

    fn put(&self, progress: &WordProgress) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO progress (word, degree, last_reviewed_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(word) DO UPDATE SET
                degree = excluded.degree,
                last_reviewed_at = excluded.last_reviewed_at",
            params![
                progress.word,
                progress.degree,
                progress.last_reviewed_secs()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn for_each(&self, visitor: &mut dyn FnMut(&WordProgress)) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT word, degree, last_reviewed_at FROM progress")?;
        let rows = stmt.query_map([], row_to_progress)?;
        for row in rows {
            visitor(&row?);
        }
        Ok(())
    }

    fn reset_all(&self) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM progress", [])?;
        tx.commit()?;
        debug!(removed, "reset all word progress");
        Ok(())
    }
}

impl CollectionStore for SqliteStore {
    fn put_members(&self, name: &str, words: &[String]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT OR IGNORE INTO collections (name) VALUES (?1)",
            params![name],
        )?;
        let mut added = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO collection_members (collection, word) VALUES (?1, ?2)",
            )?;
            for word in words {
                added += stmt.execute(params![name, word])?;
            }
        }
        tx.commit()?;
        debug!(collection = name, offered = words.len(), added, "stored collection members");
        Ok(())
    }

    fn list_collections(&self) -> Result<BTreeMap<String, usize>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.name, COUNT(m.word)
             FROM collections c
             LEFT JOIN collection_members m ON m.collection = c.name
             GROUP BY c.name",
        )?;
        let rows = stmt.query_map([], |row| {
            let name: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((name, usize::try_from(count).unwrap_or(0)))
        })?;

        let mut collections = BTreeMap::new();
        for row in rows {
            let (name, count) = row?;
            collections.insert(name, count);
        }
        Ok(collections)
    }

    fn members(&self, name: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let exists: Option<String> = conn
            .query_row(
                "SELECT name FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(DrillError::collection_not_found(name));
        }

        let mut stmt = conn.prepare(
            "SELECT word FROM collection_members WHERE collection = ?1 ORDER BY word",
        )?;
        let rows = stmt.query_map(params![name], |row| row.get::<_, String>(0))?;
        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM collection_members WHERE collection = ?1",
            params![name],
        )?;
        let removed = tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        if removed == 0 {
            // dropping the transaction rolls it back
            return Err(DrillError::collection_not_found(name));
        }
        tx.commit()?;
        debug!(collection = name, "deleted collection");
        Ok(())
    }
}
