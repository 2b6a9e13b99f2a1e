//! Unified error handling for the maintenance command.

use crate::config::ConfigError;
use std::path::{Path, PathBuf};

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] ecole_engine::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store is locked: {} exists, another run may be in progress", .0.display())]
    StoreLocked(PathBuf),
}

impl AppError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type alias for the command.
pub type Result<T> = std::result::Result<T, AppError>;
