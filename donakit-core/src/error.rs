use thiserror::Error;

use crate::secure_store::SecureStoreError;

/// Result type for field cipher operations.
pub type CipherResult<T> = Result<T, CipherError>;

/// Error outputs from the field cipher.
///
/// Every failure is surfaced to the caller; none of them are retried
/// internally and none of them ever carry plaintext or key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum CipherError {
    /// A null, absent or empty value was passed where data is required.
    #[error("invalid_input: {0}")]
    InvalidInput(String),
    /// The device secure store could not be read or written.
    #[error("storage_unavailable: {0}")]
    StorageUnavailable(String),
    /// The envelope text does not decode to `{initializationVector, data}`.
    #[error("malformed_envelope: {0}")]
    MalformedEnvelope(String),
    /// The block cipher refused to encrypt the payload.
    #[error("encryption_failure: {0}")]
    EncryptionFailure(String),
    /// Wrong key, tampered or corrupted envelope, or failed padding check.
    #[error("decryption_failure: {0}")]
    DecryptionFailure(String),
    /// The secure random source could not produce bytes.
    #[error("random_source_unavailable: {0}")]
    RandomSourceUnavailable(String),
    /// The stored key is not a 256-bit hex string.
    #[error("corrupted_key: {0}")]
    CorruptedKey(String),
    /// A decrypted payload does not have the shape the caller asked for.
    #[error("unexpected_payload: {0}")]
    UnexpectedPayload(String),
}

impl From<SecureStoreError> for CipherError {
    fn from(error: SecureStoreError) -> Self {
        Self::StorageUnavailable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_surface_as_storage_unavailable() {
        let err = CipherError::from(SecureStoreError::Unavailable("keychain locked".to_string()));
        match err {
            CipherError::StorageUnavailable(message) => {
                assert!(message.contains("keychain locked"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = CipherError::MalformedEnvelope("missing field `data`".to_string());
        assert_eq!(format!("{err}"), "malformed_envelope: missing field `data`");
    }
}
