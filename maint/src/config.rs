//! Configuration management for the maintenance command.

use std::env;
use std::path::PathBuf;

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the JSON document holding the whole dataset
    pub data_path: PathBuf,
    /// Reconcile and log, but never write the document
    pub dry_run: bool,
    /// Copy the original document to `<path>.bak` before overwriting it
    pub backup: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_path = lookup("ECOLE_DB_PATH").unwrap_or_else(|| "db.json".to_string());
        if data_path.trim().is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        let dry_run = parse_bool("ECOLE_DRY_RUN", lookup("ECOLE_DRY_RUN"), false)?;
        let backup = parse_bool("ECOLE_BACKUP", lookup("ECOLE_BACKUP"), true)?;

        Ok(Self {
            data_path: PathBuf::from(data_path),
            dry_run,
            backup,
        })
    }
}

fn parse_bool(
    var: &'static str,
    value: Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ECOLE_DB_PATH must not be empty")]
    EmptyPath,

    #[error("Invalid {var} value '{value}', expected true/false")]
    InvalidBool { var: &'static str, value: String },
}
