// Error types returned by the API client.
//
// Request failures are classified in a fixed order: transport problems first,
// then HTTP status, then JSON decoding, then missing fields the client needs
// to continue (only the upload flow has those).

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was obtained (connection, TLS, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status code >= 400.
    #[error("HTTP error: status code {status}")]
    Http { status: u16 },

    /// The body was received but is not valid JSON.
    #[error("JSON decode error: {message}")]
    Decode { message: String },

    /// Valid JSON that lacks a field required to continue.
    #[error("protocol error: {reason}")]
    Protocol { reason: String },

    #[error("failed to read local file {}: {source}", .path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A caller-supplied value was rejected before anything was sent.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

impl ApiError {
    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        ApiError::Protocol {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        ApiError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        ApiError::Config {
            reason: reason.into(),
        }
    }

    /// HTTP status carried by the error, if it is an `Http` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
