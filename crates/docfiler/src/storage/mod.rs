//! Storage layer for docfiler.
//!
//! The whole collection lives in memory inside a [`DocumentStore`] and is
//! written back in full to a [`Backend`] after every mutation. Backends only
//! know how to load and save a complete [`Database`]; nothing here does
//! partial updates.

mod json;
pub mod migrations;
pub mod schema;
mod slot;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::config::{BackendKind, Config};
use crate::document::DocumentRecord;
use crate::error::{Error, Result};

pub use json::JsonFileBackend;
pub use slot::SqliteSlotBackend;

/// The persisted document: the records plus sections this crate carries
/// through without interpreting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// All document records, in insertion order.
    #[serde(deserialize_with = "readable_documents")]
    pub documents: Vec<DocumentRecord>,
    /// User entries, passed through untouched.
    pub users: Vec<serde_json::Value>,
    /// Settings, passed through untouched.
    pub settings: serde_json::Map<String, serde_json::Value>,
}

/// Read the documents array, skipping entries that are not valid records.
fn readable_documents<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<DocumentRecord>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping unreadable document at index {}: {}", index, e);
                None
            }
        })
        .collect())
}

/// Parse a JSON documents array the way a [`Database`] load does.
pub(super) fn parse_documents(text: &str) -> serde_json::Result<Vec<DocumentRecord>> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let documents = readable_documents(&mut deserializer)?;
    deserializer.end()?;
    Ok(documents)
}

/// A persistence target that stores a whole [`Database`] at once.
pub trait Backend: Send + std::fmt::Debug {
    /// Short human-readable description, used in logs and errors.
    fn describe(&self) -> String;

    /// Read the stored database.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the target exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<Database>>;

    /// Overwrite the stored database with `db`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be written.
    fn save(&self, db: &Database) -> Result<()>;
}

/// Create the backend selected by the configuration.
///
/// Nothing is opened here; an unusable target surfaces on the first load or
/// save.
#[must_use]
pub fn open_backend(config: &Config) -> Box<dyn Backend> {
    let path = config.database_path();
    match config.storage.backend {
        BackendKind::Json => Box::new(JsonFileBackend::new(path)),
        BackendKind::Sqlite => Box::new(SqliteSlotBackend::new(path)),
    }
}

/// A backend that keeps the saved database in memory.
///
/// Clones share the same slot, so a test can keep one handle and inspect what
/// the store wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<Database>>>,
    fail_saves: bool,
}

impl MemoryBackend {
    /// Create an empty memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory backend pre-filled with `db`.
    #[must_use]
    pub fn with_database(db: Database) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(db))),
            fail_saves: false,
        }
    }

    /// Make every subsequent save through this handle fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// The last saved database, if any.
    #[must_use]
    pub fn saved(&self) -> Option<Database> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl Backend for MemoryBackend {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Option<Database>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| Error::persistence(self.describe(), "slot lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, db: &Database) -> Result<()> {
        if self.fail_saves {
            return Err(Error::persistence(self.describe(), "save rejected"));
        }
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::persistence(self.describe(), "slot lock poisoned"))?;
        *slot = Some(db.clone());
        Ok(())
    }
}

/// The in-memory document collection and its persistence target.
#[derive(Debug)]
pub struct DocumentStore {
    backend: Box<dyn Backend>,
    db: Database,
    /// Highest numeric id handed out or seen so far.
    last_id: u64,
}

impl DocumentStore {
    /// Load the collection from `backend`.
    ///
    /// Missing or unreadable data is logged and leaves the store empty; this
    /// never fails.
    #[must_use]
    pub fn load(backend: Box<dyn Backend>) -> Self {
        let db = match backend.load() {
            Ok(Some(db)) => {
                info!(
                    "Loaded {} documents from {}",
                    db.documents.len(),
                    backend.describe()
                );
                db
            }
            Ok(None) => {
                info!("No data at {}, starting empty", backend.describe());
                Database::default()
            }
            Err(e) => {
                warn!(
                    "Failed to load {}, starting empty: {}",
                    backend.describe(),
                    e
                );
                Database::default()
            }
        };

        let last_id = db
            .documents
            .iter()
            .filter_map(|d| d.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            backend,
            db,
            last_id,
        }
    }

    /// The current records in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> &[DocumentRecord] {
        &self.db.documents
    }

    /// The full in-memory database, including pass-through sections.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Description of the persistence target.
    #[must_use]
    pub fn target(&self) -> String {
        self.backend.describe()
    }

    /// Write the whole collection to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the backend rejects the write. The
    /// in-memory collection is left as it is.
    pub fn persist(&self) -> Result<()> {
        match self.backend.save(&self.db) {
            Ok(()) => {
                debug!(
                    "Saved {} documents to {}",
                    self.db.documents.len(),
                    self.backend.describe()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save {}: {}", self.backend.describe(), e);
                Err(match e {
                    Error::Persistence { .. } => e,
                    other => Error::persistence(self.backend.describe(), other.to_string()),
                })
            }
        }
    }

    /// Look up a record by internal id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.db.documents.iter().find(|d| d.id == id)
    }

    /// Allocate a fresh internal id based on `now`.
    ///
    /// Ids are decimal millisecond timestamps, bumped past every id this
    /// store has seen so none is ever reused.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last_id = millis.max(self.last_id.saturating_add(1));
        self.last_id.to_string()
    }

    pub(crate) fn push(&mut self, record: DocumentRecord) {
        if let Ok(n) = record.id.parse::<u64>() {
            self.last_id = self.last_id.max(n);
        }
        self.db.documents.push(record);
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut DocumentRecord> {
        self.db.documents.iter_mut().find(|d| d.id == id)
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<DocumentRecord> {
        let index = self.db.documents.iter().position(|d| d.id == id)?;
        Some(self.db.documents.remove(index))
    }
}
