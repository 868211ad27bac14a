//! Error types for docfiler.
//!
//! This module defines all error types used throughout the docfiler crate.
//! The three variants callers usually branch on are [`Error::Validation`],
//! [`Error::NotFound`] and [`Error::Persistence`]; the rest wrap lower-level
//! failures from configuration, I/O, JSON and `SQLite`.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for docfiler operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Service Errors ===
    /// A create or update payload was rejected.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of what was wrong with the payload.
        message: String,
    },

    /// No document with the given id exists.
    #[error("document not found: {id}")]
    NotFound {
        /// The internal id that was looked up.
        id: String,
    },

    // === Storage Errors ===
    /// Reading from or writing to the persistence target failed.
    #[error("persistence failed for {target}: {message}")]
    Persistence {
        /// Human-readable description of the persistence target.
        target: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to open or create the slot database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to initialise the slot database schema.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for docfiler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error for the given document id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a new persistence error.
    #[must_use]
    pub fn persistence(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a rejected payload.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error indicates a missing document.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from the persistence target.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
