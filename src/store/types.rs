//! Store error types

use std::path::PathBuf;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persisted document exists but cannot be parsed
    #[error("Store {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Filesystem failure while reading or writing
    #[error("Store I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// In-memory state could not be serialized
    #[error("Failed to encode store {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether the persisted state is unreadable (fail closed)
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}
