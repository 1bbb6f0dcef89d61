//! Error types for the pending view merge.

use thiserror::Error;

/// Main error type for merge runs.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Aggregate document not found: {0}")]
    MissingAggregate(String),

    #[error("Failed to remove staging folder {name}: {source}")]
    StagingCleanup {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Data directory is locked by another merge run")]
    Locked,
}

impl From<serde_json::Error> for MergeError {
    fn from(e: serde_json::Error) -> Self {
        MergeError::Serialization(e.to_string())
    }
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
