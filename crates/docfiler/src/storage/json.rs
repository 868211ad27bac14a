//! Flat JSON file backend.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Backend, Database};
use crate::error::{Error, Result};

/// Stores the database as one pretty-printed JSON file.
///
/// Saves go to a sibling temp file which is then renamed over the target, so
/// a reader sees either the old file or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend for the file at `path`. Nothing is touched on disk
    /// until the first load or save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Backend for JsonFileBackend {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<Database>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::persistence(self.describe(), e.to_string())),
        };
        let db = serde_json::from_slice(&bytes)
            .map_err(|e| Error::persistence(self.describe(), e.to_string()))?;
        Ok(Some(db))
    }

    fn save(&self, db: &Database) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let bytes = serde_json::to_vec_pretty(db)?;
        let temp = self.temp_path();
        std::fs::write(&temp, &bytes)
            .map_err(|e| Error::persistence(temp.display().to_string(), e.to_string()))?;
        std::fs::rename(&temp, &self.path)
            .map_err(|e| Error::persistence(self.describe(), e.to_string()))?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}
