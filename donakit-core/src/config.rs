use crate::error::{CipherError, CipherResult};

/// Secure store identifier under which deployed installs keep their key.
pub const DEFAULT_KEY_IDENTIFIER: &str = "my_aes_key";

/// Length in bytes of the installation key (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Length in bytes of the per-envelope initialization vector.
pub const IV_LENGTH: usize = 16;

/// Length in bytes of the HMAC-SHA256 tag appended to every ciphertext.
pub const TAG_LENGTH: usize = 32;

pub(crate) const HKDF_SALT: &[u8] = b"donakit:field-cipher:v1";
pub(crate) const HKDF_INFO_ENCRYPTION: &[u8] = b"donakit:field-cipher:aes-256-cbc";
pub(crate) const HKDF_INFO_AUTHENTICATION: &[u8] = b"donakit:field-cipher:hmac-sha256";

/// Runtime configuration for a [`crate::FieldCipher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCipherConfig {
    key_identifier: String,
}

impl FieldCipherConfig {
    /// Builds a configuration that keeps the key under `key_identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidInput`] if the identifier is empty or
    /// only whitespace.
    pub fn new(key_identifier: impl Into<String>) -> CipherResult<Self> {
        let key_identifier = key_identifier.into();
        if key_identifier.trim().is_empty() {
            return Err(CipherError::InvalidInput(
                "key identifier must not be empty".to_string(),
            ));
        }
        Ok(Self { key_identifier })
    }

    /// Identifier of the secure store entry holding the key.
    #[must_use]
    pub fn key_identifier(&self) -> &str {
        &self.key_identifier
    }
}

impl Default for FieldCipherConfig {
    fn default() -> Self {
        Self {
            key_identifier: DEFAULT_KEY_IDENTIFIER.to_string(),
        }
    }
}
