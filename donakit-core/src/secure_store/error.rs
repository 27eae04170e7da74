//! Error types for secure store collaborators.

use thiserror::Error;

/// Result type for secure store operations.
pub type SecureStoreResult<T> = Result<T, SecureStoreError>;

/// Errors raised by secure store implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecureStoreError {
    /// The platform store refused or could not serve the request.
    #[error("secure store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem errors from file-backed stores.
    #[error("secure store io error: {0}")]
    Io(String),

    /// Errors coming from the store lock.
    #[error("secure store lock error: {0}")]
    Lock(String),
}

impl From<std::io::Error> for SecureStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
