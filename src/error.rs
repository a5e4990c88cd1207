//! Error types for record storage and activity registration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the record store and by input validation.
///
/// The aggregation layer has no error type: every statistic is total.
#[derive(Error, Debug)]
pub enum TallyError {
    /// The record file could not be read or parsed. The store recovers by
    /// moving the file aside and starting from an empty set, so this is
    /// surfaced as a warning rather than returned as a failure.
    #[error("Record file {} was unreadable ({reason}); moved to {}", path.display(), quarantined_to.display())]
    CorruptStorage {
        path: PathBuf,
        quarantined_to: PathBuf,
        reason: String,
    },

    /// The crash-safe write sequence failed. The previous file is intact.
    #[error("Could not save records to {}: {source}", path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other filesystem failure while handling the record file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record or registration request failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;

impl TallyError {
    /// Create an invalid-input error from a message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PersistFailure {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TallyError::invalid("distance must be non-negative");
        assert_eq!(
            err.to_string(),
            "Invalid input: distance must be non-negative"
        );

        let err = TallyError::CorruptStorage {
            path: PathBuf::from("data.json"),
            quarantined_to: PathBuf::from("data.json.corrupt-20250101T000000"),
            reason: "expected value".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("data.json"));
        assert!(msg.contains("corrupt-20250101T000000"));
        assert!(msg.contains("expected value"));
    }
}
