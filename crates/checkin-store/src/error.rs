use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Generic I/O error (reading, writing or renaming the document).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while writing.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// An existing document could not be parsed.
    #[error("Corrupt ledger document {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
