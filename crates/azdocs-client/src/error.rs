use std::path::PathBuf;

use thiserror::Error;

/// Failure of one backend call. Nothing is retried; callers decide how to
/// degrade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, reset, ...).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// The backend answered with a body that does not match the contract.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// The request could not be built; nothing was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status of a failed request, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
