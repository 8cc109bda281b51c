//! Error types for the index crate.

use std::path::PathBuf;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A path could not be normalized to a working-copy relative path.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// Another invocation holds the index lock.
    #[error("staging index is locked by another process (remove {} if it is stale)", path.display())]
    Locked { path: PathBuf },

    /// The persisted index file could not be decoded.
    #[error("corrupt staging index at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The ignore rules could not be compiled.
    #[error("ignore rules: {0}")]
    IgnoreRules(String),

    /// Serialization error while writing the index.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
