//! Exclusive lock over a store for the duration of a run.

use super::file::sibling;
use crate::error::{AppError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Lock file `<data path>.lock`, created exclusively and removed on drop.
///
/// A stale lock left by a killed run must be removed by hand.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    /// Take the lock for `data_path`, failing if another run holds it.
    pub fn acquire(data_path: &Path) -> Result<Self> {
        let path = sibling(data_path, ".lock");

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::StoreLocked(path));
            }
            Err(e) => return Err(AppError::io(&path, e)),
        };

        // Record the holder's pid to help whoever finds a stale lock.
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            let _ = fs::remove_file(&path);
            return Err(AppError::io(&path, e));
        }

        tracing::debug!("Acquired {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_exclusive_and_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("db.json");

        let lock = StoreLock::acquire(&data).unwrap();
        assert_eq!(lock.path(), dir.path().join("db.json.lock"));
        assert!(lock.path().exists());

        let second = StoreLock::acquire(&data);
        assert!(matches!(second, Err(AppError::StoreLocked(_))));

        drop(lock);
        assert!(!dir.path().join("db.json.lock").exists());
        assert!(StoreLock::acquire(&data).is_ok());
    }

    #[test]
    fn lock_in_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("absent").join("db.json");

        assert!(matches!(
            StoreLock::acquire(&data),
            Err(AppError::Io { .. })
        ));
    }
}
