/// Errors from tree assembly.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    /// A blob path is absolute, empty, or escapes the working copy.
    #[error("invalid tree path: {0:?}")]
    InvalidPath(String),

    /// Two blobs claim the same path.
    #[error("duplicate tree path: {0}")]
    DuplicatePath(String),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
