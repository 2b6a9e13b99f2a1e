//! Error types for the reconciliation engine.

use thiserror::Error;

/// All possible errors from the engine.
///
/// Dangling references and missing optional fields are never errors: the
/// reconciler repairs them and records a [`crate::Repair`]. The only failure
/// is input that does not have the collection-of-records shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("failed to serialize snapshot: {0}")]
    Serialization(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidSnapshot("expected a sequence".into());
        assert_eq!(err.to_string(), "invalid snapshot: expected a sequence");

        let err = Error::Serialization("key must be a string".into());
        assert_eq!(
            err.to_string(),
            "failed to serialize snapshot: key must be a string"
        );
    }
}
