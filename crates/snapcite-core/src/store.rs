//! Saved-citation persistence.
//!
//! The persisted list is a single JSON array stored under
//! [`SAVED_CITATIONS_KEY`] in any [`KeyValueStore`]. Two stores ship here:
//! [`MemoryStore`] for tests and short-lived hosts, and [`SqliteStore`] which
//! survives process restarts.
//!
//! Read-modify-write operations on [`SavedCitations`] are not atomic across
//! processes; one interactive client at a time is assumed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key under which the saved-citation list is stored.
pub const SAVED_CITATIONS_KEY: &str = "savedCitations";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to (de)serialize saved citations: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Minimal get/set storage collaborator.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store: one `kv` table, WAL journal.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;
             CREATE TABLE IF NOT EXISTS kv (
                 key   TEXT PRIMARY KEY,
                 value TEXT NOT NULL
             );",
        )?;
        tracing::debug!(path = %path.display(), "opened citation store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish()
    }
}

/// A citation the user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCitation {
    pub title: String,
    pub text: String,
    /// Style name the text was rendered in.
    pub format: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl SavedCitation {
    /// Build an entry stamped with the current time.
    pub fn new(title: impl Into<String>, text: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            format: format.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Newest-first list of saved citations on top of a [`KeyValueStore`].
pub struct SavedCitations<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SavedCitations<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All entries, newest first. A missing key is an empty list.
    pub fn list(&self) -> Result<Vec<SavedCitation>, StoreError> {
        match self.store.get(SAVED_CITATIONS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(vec![]),
        }
    }

    /// Insert at the front.
    pub fn save(&self, entry: SavedCitation) -> Result<(), StoreError> {
        let mut entries = self.list()?;
        entries.insert(0, entry);
        self.write(&entries)
    }

    /// Remove the entry at `index`. Out-of-range indices are a no-op and
    /// return `None`.
    pub fn delete(&self, index: usize) -> Result<Option<SavedCitation>, StoreError> {
        let mut entries = self.list()?;
        if index >= entries.len() {
            tracing::debug!(index, len = entries.len(), "delete index out of range");
            return Ok(None);
        }
        let removed = entries.remove(index);
        self.write(&entries)?;
        Ok(Some(removed))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.write(&[])
    }

    fn write(&self, entries: &[SavedCitation]) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(SAVED_CITATIONS_KEY, &json)
    }
}
