//! Single-document JSON file store.

use super::DatasetStore;
use crate::error::{AppError, Result};
use ecole_engine::SchoolSnapshot;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores the snapshot as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the copy written by [`DatasetStore::backup`].
    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.path, ".bak")
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, ".tmp")
    }
}

/// `<path><suffix>`, in the same directory as `path`.
pub(crate) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("db.json"));
    name.push(suffix);
    path.with_file_name(name)
}

impl DatasetStore for JsonFileStore {
    fn load(&self) -> Result<SchoolSnapshot> {
        let text = fs::read_to_string(&self.path).map_err(|e| AppError::io(&self.path, e))?;
        Ok(SchoolSnapshot::from_json(&text)?)
    }

    fn save(&self, snapshot: &SchoolSnapshot) -> Result<()> {
        let mut text = snapshot.to_json_pretty()?;
        text.push('\n');

        // Replace via rename: readers see the old or the new document, never half.
        let temp = self.temp_path();
        fs::write(&temp, text).map_err(|e| AppError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| AppError::io(&self.path, e))?;

        tracing::debug!("Wrote {}", self.path.display());
        Ok(())
    }

    fn backup(&self) -> Result<()> {
        let backup = self.backup_path();
        fs::copy(&self.path, &backup).map_err(|e| AppError::io(&backup, e))?;
        tracing::info!("Backed up original document to {}", backup.display());
        Ok(())
    }
}
