//! `SQLite` schema definitions for the slot backend.
//!
//! The slot database is a plain key/value store: each top-level section of
//! the [`Database`](super::Database) is one row holding its JSON text.

/// SQL statement to create the slots table.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_SLOTS_TABLE, CREATE_METADATA_TABLE];

/// Slot holding the documents array.
pub const DOCUMENTS_SLOT: &str = "documents";

/// Slot holding the users array.
pub const USERS_SLOT: &str = "users";

/// Slot holding the settings object.
pub const SETTINGS_SLOT: &str = "settings";
