use std::path::PathBuf;

use ferry_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service refused the request; the reason is reported verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("unexpected {response} response to {request}")]
    UnexpectedResponse {
        request: &'static str,
        response: &'static str,
    },

    #[error("invalid remote URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cannot load CA certificate {path}: {reason}")]
    InvalidCertificate { path: PathBuf, reason: String },
}

impl RemoteError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// `true` when the failure came from local setup rather than the service.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::InvalidCertificate { .. })
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;
