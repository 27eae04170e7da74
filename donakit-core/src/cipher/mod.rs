//! The field cipher: seals single attributes into envelope strings.
//!
//! A [`FieldCipher`] owns no key material between calls. Every operation reads
//! the installation key from the injected [`SecureKeyStore`], creating it on the
//! very first use, and draws a fresh IV for each envelope.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::config::{FieldCipherConfig, IV_LENGTH};
use crate::error::{CipherError, CipherResult};
use crate::secure_store::SecureKeyStore;

mod envelope;
mod key;
mod payload;
mod primitives;
mod random;

pub use envelope::Envelope;
pub use key::FieldKey;
pub use payload::DecryptedPayload;
pub use random::{OsRandomSource, RandomSource};

use key::KeyManager;
use random::random_array;

/// Encrypts and decrypts individual profile attributes with the installation key.
///
/// Cheap to share behind an `Arc`; all methods take `&self` and may run
/// concurrently. Instances built over the same store and identifier always
/// agree on the key.
pub struct FieldCipher {
    keys: KeyManager,
    random: Arc<dyn RandomSource>,
}

impl FieldCipher {
    /// Creates a cipher over `store` using the OS random source and the default
    /// key identifier.
    #[must_use]
    pub fn new(store: Arc<dyn SecureKeyStore>) -> Self {
        Self::with_components(
            store,
            Arc::new(OsRandomSource),
            FieldCipherConfig::default(),
        )
    }

    /// Creates a cipher with every collaborator supplied explicitly.
    #[must_use]
    pub fn with_components(
        store: Arc<dyn SecureKeyStore>,
        random: Arc<dyn RandomSource>,
        config: FieldCipherConfig,
    ) -> Self {
        let identifier = config.key_identifier().to_string();
        Self {
            keys: KeyManager::new(store, Arc::clone(&random), identifier),
            random,
        }
    }

    /// Identifier the installation key is stored under.
    #[must_use]
    pub fn key_identifier(&self) -> &str {
        self.keys.identifier()
    }

    /// Returns the installation key, creating and persisting it if absent.
    ///
    /// # Errors
    ///
    /// [`CipherError::StorageUnavailable`], [`CipherError::RandomSourceUnavailable`]
    /// or [`CipherError::CorruptedKey`].
    pub async fn obtain_key(&self) -> CipherResult<FieldKey> {
        self.keys.obtain_or_create().await
    }

    /// Encrypts `payload` into an envelope string.
    ///
    /// Strings are encrypted as their raw text; any other JSON value as its
    /// serialization.
    ///
    /// # Errors
    ///
    /// - [`CipherError::InvalidInput`] for `null` or `""`.
    /// - Key errors from [`FieldCipher::obtain_key`].
    /// - [`CipherError::RandomSourceUnavailable`] if no IV can be drawn.
    /// - [`CipherError::EncryptionFailure`] if the primitive fails.
    pub async fn encrypt(&self, payload: &Value) -> CipherResult<String> {
        let plaintext = payload::canonicalize(payload)?;
        self.seal(&plaintext).await
    }

    /// Encrypts a plain string without wrapping it in a [`Value`] first.
    ///
    /// # Errors
    ///
    /// Same as [`FieldCipher::encrypt`].
    pub async fn encrypt_text(&self, text: &str) -> CipherResult<String> {
        let plaintext = payload::canonical_text(text)?;
        self.seal(&plaintext).await
    }

    /// Serializes `value` to JSON and encrypts the result.
    ///
    /// # Errors
    ///
    /// [`CipherError::InvalidInput`] if `value` serializes to `null`, otherwise
    /// same as [`FieldCipher::encrypt`].
    pub async fn encrypt_serialized<T: Serialize + Sync + ?Sized>(
        &self,
        value: &T,
    ) -> CipherResult<String> {
        let payload = serde_json::to_value(value)
            .map_err(|err| CipherError::EncryptionFailure(format!("payload serialization: {err}")))?;
        self.encrypt(&payload).await
    }

    /// Decrypts an envelope and returns the plaintext exactly as it was sealed,
    /// without interpreting it as JSON.
    ///
    /// # Errors
    ///
    /// - [`CipherError::InvalidInput`] for an empty envelope.
    /// - [`CipherError::MalformedEnvelope`] if the text is not an envelope.
    /// - Key errors from [`FieldCipher::obtain_key`].
    /// - [`CipherError::DecryptionFailure`] for a wrong key, tampering or
    ///   corrupted contents.
    pub async fn decrypt_text(&self, envelope: &str) -> CipherResult<String> {
        let envelope = Envelope::parse(envelope)?;
        let key = self.obtain_key().await?;

        let iv = envelope.iv()?;
        let sealed = envelope.sealed()?;
        let subkeys = key.subkeys()?;
        let mut plaintext = primitives::open(&subkeys, &iv, &sealed).inspect_err(|err| {
            log::warn!("rejected envelope of {} bytes: {err}", sealed.len());
        })?;

        let text = String::from_utf8(std::mem::take(&mut *plaintext)).map_err(|err| {
            drop(Zeroizing::new(err.into_bytes()));
            CipherError::DecryptionFailure("plaintext is not valid utf-8".to_string())
        })?;
        log::debug!("decrypted envelope into {} bytes", text.len());
        Ok(text)
    }

    /// Decrypts an envelope, telling structured payloads and plain text apart.
    ///
    /// # Errors
    ///
    /// Same as [`FieldCipher::decrypt_text`].
    pub async fn decrypt_payload(&self, envelope: &str) -> CipherResult<DecryptedPayload> {
        self.decrypt_text(envelope)
            .await
            .map(DecryptedPayload::from_text)
    }

    /// Decrypts an envelope into a JSON value; plain text comes back as a JSON string.
    ///
    /// # Errors
    ///
    /// Same as [`FieldCipher::decrypt_payload`].
    pub async fn decrypt(&self, envelope: &str) -> CipherResult<Value> {
        Ok(self.decrypt_payload(envelope).await?.into_value())
    }

    /// Decrypts an envelope and deserializes the payload into `T`.
    ///
    /// # Errors
    ///
    /// [`CipherError::UnexpectedPayload`] if the payload does not fit `T`,
    /// otherwise same as [`FieldCipher::decrypt_payload`].
    pub async fn decrypt_deserialized<T: DeserializeOwned>(&self, envelope: &str) -> CipherResult<T> {
        let value = self.decrypt(envelope).await?;
        serde_json::from_value(value)
            .map_err(|err| CipherError::UnexpectedPayload(err.to_string()))
    }

    async fn seal(&self, plaintext: &str) -> CipherResult<String> {
        let key = self.obtain_key().await?;
        let iv = random_array::<IV_LENGTH>(self.random.as_ref())?;
        let subkeys = key.subkeys()?;
        let sealed = primitives::seal(&subkeys, &iv, plaintext.as_bytes())?;
        log::debug!(
            "sealed {} plaintext bytes into {} envelope bytes",
            plaintext.len(),
            sealed.len()
        );
        Envelope::new(&iv, &sealed).to_json()
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("key_identifier", &self.key_identifier())
            .finish_non_exhaustive()
    }
}
