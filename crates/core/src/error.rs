//! Error types for the history store
//!
//! Every fault the store can run into internally is described here.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Most of these errors never reach a caller: the store facade logs them and
//! keeps serving from memory. Only [`HistoryError::StorageUnavailable`] and
//! [`HistoryError::Config`] are returned from construction.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for history store operations
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Error types for the history store
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Primary history file is unreadable or malformed
    #[error("Primary history file {path} unreadable: {reason}")]
    PrimaryRead {
        /// Primary file path
        path: PathBuf,
        /// What went wrong while reading or parsing
        reason: String,
    },

    /// Backup history file is unreadable or malformed
    #[error("Backup history file {path} unreadable: {reason}")]
    BackupRead {
        /// Backup file path
        path: PathBuf,
        /// What went wrong while reading or parsing
        reason: String,
    },

    /// Writing the history file (or its backup) failed
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File being written when the failure happened
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Encoding the collection failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An artifact file could not be removed
    #[error("Failed to remove artifact {path}: {source}")]
    ArtifactCleanup {
        /// Artifact path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The storage directory could not be created or opened
    #[error("Storage directory {path} unavailable: {source}")]
    StorageUnavailable {
        /// Data directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Invalid store configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl HistoryError {
    /// Create a write error for `path`
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HistoryError::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        HistoryError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_primary_read() {
        let err = HistoryError::PrimaryRead {
            path: PathBuf::from("/data/history.json"),
            reason: "expected value at line 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Primary history file"));
        assert!(msg.contains("history.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_error_display_write() {
        let err = HistoryError::write(
            "/data/history.json.tmp",
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("Failed to write"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse: Result<Vec<u8>, serde_json::Error> = serde_json::from_str("[1, 2");
        let err: HistoryError = parse.unwrap_err().into();
        assert!(matches!(err, HistoryError::Serialization(_)));
    }

    #[test]
    fn test_error_display_storage_unavailable() {
        let err = HistoryError::StorageUnavailable {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope"));
        assert!(msg.contains("denied"));
    }
}
