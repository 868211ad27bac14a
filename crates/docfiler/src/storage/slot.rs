//! Local key/value slot backend on `SQLite`.
//!
//! Mirrors a browser's local storage: the serialized documents array sits
//! under the `documents` key, with `users` and `settings` in slots beside it.
//! A save replaces all three slots in one transaction.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::migrations;
use super::schema::{DOCUMENTS_SLOT, SETTINGS_SLOT, USERS_SLOT};
use super::{parse_documents, Backend, Database};
use crate::error::{Error, Result};

/// Key/value slot storage in a `SQLite` file.
///
/// The connection is opened on first use, so a missing or corrupt file is
/// reported by [`Backend::load`] and [`Backend::save`] rather than at
/// construction.
#[derive(Debug)]
pub struct SqliteSlotBackend {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, once opened.
    conn: OnceCell<Connection>,
}

impl SqliteSlotBackend {
    /// Create a backend for the database at `path` without opening it.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: OnceCell::new(),
        }
    }

    /// Open or create a slot database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let backend = Self::new(path.as_ref());
        backend.connection()?;
        Ok(backend)
    }

    /// Create an in-memory slot database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: OnceCell::from(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(path: &Path) -> Result<Connection> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening slot database at {}", path.display());
        let conn = Connection::open(path).map_err(|source| Error::DatabaseOpen {
            path: path.to_path_buf(),
            source,
        })?;
        // Fails here, not at open, when the file is not a database
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Slot database opened at {}", path.display());
        Ok(conn)
    }

    /// The open connection, opening it first if needed.
    ///
    /// A failed open is not cached; the next call tries again.
    fn connection(&self) -> Result<&Connection> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }
        let conn = Self::connect(&self.path)?;
        Ok(self.conn.get_or_init(|| conn))
    }

    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .connection()?
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn parse_slot<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.read_slot(key)? {
            Some(text) => serde_json::from_str(&text).map_err(|e| self.slot_error(key, &e)),
            None => Ok(T::default()),
        }
    }

    fn slot_error(&self, key: &str, e: &serde_json::Error) -> Error {
        Error::persistence(self.describe(), format!("slot {key}: {e}"))
    }
}

impl Backend for SqliteSlotBackend {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn load(&self) -> Result<Option<Database>> {
        let Some(documents) = self.read_slot(DOCUMENTS_SLOT)? else {
            return Ok(None);
        };
        Ok(Some(Database {
            documents: parse_documents(&documents)
                .map_err(|e| self.slot_error(DOCUMENTS_SLOT, &e))?,
            users: self.parse_slot(USERS_SLOT)?,
            settings: self.parse_slot(SETTINGS_SLOT)?,
        }))
    }

    fn save(&self, db: &Database) -> Result<()> {
        let slots = [
            (DOCUMENTS_SLOT, serde_json::to_string(&db.documents)?),
            (USERS_SLOT, serde_json::to_string(&db.users)?),
            (SETTINGS_SLOT, serde_json::to_string(&db.settings)?),
        ];

        let tx = self.connection()?.unchecked_transaction()?;
        for (key, value) in &slots {
            tx.execute(
                r"
                INSERT OR REPLACE INTO slots (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ",
                params![key, value],
            )?;
        }
        tx.commit()?;

        debug!("Saved {} slots to {}", slots.len(), self.path.display());
        Ok(())
    }
}
