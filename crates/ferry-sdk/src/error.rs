use std::path::PathBuf;

use ferry_index::IndexError;
use ferry_sync::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// Missing or malformed input; nothing was touched.
    #[error("{0}")]
    Usage(String),

    #[error("{}: {reason}", .path.display())]
    Filesystem { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote service refused the request or could not be reached.
    #[error("remote error: {0}")]
    Remote(String),

    /// The working copy is not in a state that allows the operation.
    #[error("{0}")]
    State(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("index error: {0}")]
    Index(IndexError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SdkError {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            Self::Filesystem { .. } | Self::Io(_) => 3,
            Self::Remote(_) => 4,
            Self::State(_) => 5,
            Self::Config(_) => 6,
            Self::Index(_) | Self::Internal(_) => 1,
        }
    }

    /// Short category name, used in log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::Filesystem { .. } | Self::Io(_) => "filesystem",
            Self::Remote(_) => "remote",
            Self::State(_) => "state",
            Self::Config(_) => "config",
            Self::Index(_) | Self::Internal(_) => "internal",
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Filesystem {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<IndexError> for SdkError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Locked { path } => Self::State(format!(
                "staging index is locked by another ferry process (remove {} if it is stale)",
                path.display()
            )),
            IndexError::InvalidPath(path) => Self::Usage(format!("invalid path: {path}")),
            IndexError::Corrupt { path, reason } => Self::Filesystem {
                path,
                reason: format!("corrupt staging index: {reason}"),
            },
            IndexError::Io(e) => Self::Io(e),
            other => Self::Index(other),
        }
    }
}

impl From<RemoteError> for SdkError {
    fn from(err: RemoteError) -> Self {
        if err.is_configuration() {
            return Self::Config(err.to_string());
        }
        match err {
            RemoteError::Rejected(reason) => Self::Remote(reason),
            other => Self::Remote(other.to_string()),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(SdkError::Usage("x".into()).exit_code(), 2);
        assert_eq!(SdkError::filesystem("a.txt", "denied").exit_code(), 3);
        assert_eq!(SdkError::Remote("x".into()).exit_code(), 4);
        assert_eq!(SdkError::State("x".into()).exit_code(), 5);
        assert_eq!(SdkError::Config("x".into()).exit_code(), 6);
        assert_eq!(SdkError::Internal("x".into()).exit_code(), 1);
    }

    #[test]
    fn locked_index_is_a_state_error() {
        let err: SdkError = IndexError::Locked {
            path: PathBuf::from("/tmp/staged.json.lock"),
        }
        .into();
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn rejection_reason_is_kept_verbatim() {
        let err: SdkError = RemoteError::Rejected("repository 7 not found".into()).into();
        assert_eq!(err.to_string(), "remote error: repository 7 not found");
        assert_eq!(err.kind(), "remote");
    }

    #[test]
    fn bad_remote_url_is_a_config_error() {
        let err: SdkError = RemoteError::InvalidUrl {
            url: "nope".into(),
            reason: "relative URL without a base".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 6);
    }
}
