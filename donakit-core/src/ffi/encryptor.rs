//! `FieldEncryptor`, the object Swift and Kotlin use to seal and open profile fields.

use std::sync::Arc;

use serde_json::Value;

use super::store::{ForeignKeyStore, ForeignSecureStore};
use crate::cipher::{DecryptedPayload, FieldCipher, OsRandomSource};
use crate::config::FieldCipherConfig;
use crate::error::{CipherError, CipherResult};

/// Decrypted field as handed to Swift/Kotlin.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum DecryptedData {
    /// The plaintext is JSON; `json` is its canonical serialization.
    Structured {
        /// Serialized JSON value.
        json: String,
    },
    /// The plaintext is not JSON.
    PlainText {
        /// Raw plaintext.
        text: String,
    },
}

impl TryFrom<DecryptedPayload> for DecryptedData {
    type Error = CipherError;

    fn try_from(payload: DecryptedPayload) -> CipherResult<Self> {
        match payload {
            DecryptedPayload::Structured(value) => Ok(Self::Structured {
                json: serde_json::to_string(&value).map_err(|err| {
                    CipherError::DecryptionFailure(format!("payload serialization: {err}"))
                })?,
            }),
            DecryptedPayload::PlainText(text) => Ok(Self::PlainText { text }),
        }
    }
}

/// Encrypts and decrypts profile fields with the installation key.
///
/// # Example (Kotlin)
///
/// ```kotlin
/// val encryptor = FieldEncryptor(KeystoreStore(context), null)
/// val envelope = encryptor.encryptText("donor@example.com")
/// when (val field = encryptor.decryptData(envelope)) {
///     is DecryptedData.PlainText -> show(field.text)
///     is DecryptedData.Structured -> show(JSONObject(field.json))
/// }
/// ```
#[derive(Debug, uniffi::Object)]
pub struct FieldEncryptor {
    inner: FieldCipher,
}

#[uniffi::export(async_runtime = "tokio")]
impl FieldEncryptor {
    /// Creates an encryptor over the platform store.
    ///
    /// `key_identifier` defaults to the identifier existing installs use.
    ///
    /// # Errors
    ///
    /// [`CipherError::InvalidInput`] if `key_identifier` is blank.
    #[uniffi::constructor]
    pub fn new(
        store: Arc<dyn ForeignSecureStore>,
        key_identifier: Option<String>,
    ) -> Result<Self, CipherError> {
        let config = match key_identifier {
            Some(identifier) => FieldCipherConfig::new(identifier)?,
            None => FieldCipherConfig::default(),
        };
        let store = Arc::new(ForeignKeyStore::new(store));
        Ok(Self {
            inner: FieldCipher::with_components(store, Arc::new(OsRandomSource), config),
        })
    }

    /// Encrypts a JSON-encoded value (object, array, number, boolean or string).
    ///
    /// # Errors
    ///
    /// [`CipherError::InvalidInput`] if `json` is absent, not JSON, `null` or
    /// `""`; otherwise any error of [`FieldCipher::encrypt`].
    pub async fn encrypt_data(&self, json: Option<String>) -> Result<String, CipherError> {
        let json = required(json, "payload")?;
        let payload: Value = serde_json::from_str(&json)
            .map_err(|err| CipherError::InvalidInput(format!("payload is not json: {err}")))?;
        self.inner.encrypt(&payload).await
    }

    /// Encrypts a plain string as-is.
    ///
    /// # Errors
    ///
    /// [`CipherError::InvalidInput`] if `text` is absent or empty; otherwise
    /// any error of [`FieldCipher::encrypt`].
    pub async fn encrypt_text(&self, text: Option<String>) -> Result<String, CipherError> {
        let text = required(text, "text")?;
        self.inner.encrypt_text(&text).await
    }

    /// Decrypts an envelope.
    ///
    /// # Errors
    ///
    /// [`CipherError::InvalidInput`] if `envelope` is absent or empty; otherwise
    /// any error of [`FieldCipher::decrypt_payload`].
    pub async fn decrypt_data(&self, envelope: Option<String>) -> Result<DecryptedData, CipherError> {
        let envelope = required(envelope, "envelope")?;
        DecryptedData::try_from(self.inner.decrypt_payload(&envelope).await?)
    }

    /// Identifier the key is stored under.
    #[must_use]
    pub fn key_identifier(&self) -> String {
        self.inner.key_identifier().to_string()
    }
}

fn required(value: Option<String>, attribute: &str) -> CipherResult<String> {
    value.ok_or_else(|| CipherError::InvalidInput(format!("{attribute} is required")))
}
