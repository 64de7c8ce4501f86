//! Structured error types for portal-core library.
//!
//! Uses `thiserror` so the server and CLI can match on failure kinds.
//! The binary (portal-cli) wraps these in `anyhow` for convenience,
//! while the HTTP layer maps them onto status codes.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

/// Main error type for portal-core operations
#[derive(Error, Debug)]
pub enum PortalError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Transport-level failure talking to a candidate source
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Candidate source answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body did not have the `{ apps: [...] }` shape
    #[error("malformed apps document from {origin}: {reason}")]
    MalformedDocument { origin: String, reason: String },

    /// A configured source location could not be interpreted
    #[error("invalid source '{value}': {reason}")]
    InvalidSource { value: String, reason: String },

    /// Dependency never became ready within the retry budget
    #[error("{dependency} not ready after {attempts} attempts")]
    NotReady {
        dependency: &'static str,
        attempts: usize,
    },

    /// File or directory not found
    #[error("Path not found: {path:?}")]
    PathNotFound { path: PathBuf },

    /// Document store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for portal-core operations
pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    /// Create a transport error for the given URL
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// Create a non-success status error
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create a malformed document error
    pub fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid source error
    pub fn invalid_source(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
