//! Installation key lifecycle: obtain the stored key or create it once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use hkdf::Hkdf;
use secrecy::{ExposeSecret, SecretBox};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::{HKDF_INFO_AUTHENTICATION, HKDF_INFO_ENCRYPTION, HKDF_SALT, KEY_LENGTH};
use crate::error::{CipherError, CipherResult};
use crate::secure_store::SecureKeyStore;

use super::random::{random_array, RandomSource};

/// The installation's symmetric key (256 bits).
///
/// Zeroized on drop; `Debug` never prints the material.
pub struct FieldKey {
    material: SecretBox<[u8; KEY_LENGTH]>,
}

impl FieldKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self {
            material: SecretBox::new(Box::new(bytes)),
        }
    }

    pub(crate) fn generate(random: &dyn RandomSource) -> CipherResult<Self> {
        let bytes = Zeroizing::new(random_array::<KEY_LENGTH>(random)?);
        Ok(Self::from_bytes(*bytes))
    }

    /// Parses the hex form kept in the secure store.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::CorruptedKey`] unless `encoded` is exactly
    /// 64 hex characters. Shorter legacy keys are refused, not padded.
    pub fn from_hex(encoded: &str) -> CipherResult<Self> {
        let decoded = Zeroizing::new(
            hex::decode(encoded.trim())
                .map_err(|err| CipherError::CorruptedKey(format!("stored key is not hex: {err}")))?,
        );
        if decoded.len() != KEY_LENGTH {
            return Err(CipherError::CorruptedKey(format!(
                "stored key length mismatch: expected {KEY_LENGTH} bytes, got {}",
                decoded.len()
            )));
        }
        let mut bytes = [0u8; KEY_LENGTH];
        bytes.copy_from_slice(&decoded);
        let key = Self::from_bytes(bytes);
        zeroize::Zeroize::zeroize(&mut bytes);
        Ok(key)
    }

    /// Hex encoding as persisted in the secure store. Treat as sensitive.
    #[must_use]
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.material.expose_secret()))
    }

    /// Derives the independent AES and HMAC keys used for one envelope.
    pub(crate) fn subkeys(&self) -> CipherResult<SubKeys> {
        let hkdf = Hkdf::<Sha256>::new(Some(HKDF_SALT), self.material.expose_secret());
        let mut encryption = Zeroizing::new([0u8; KEY_LENGTH]);
        let mut authentication = Zeroizing::new([0u8; KEY_LENGTH]);
        hkdf.expand(HKDF_INFO_ENCRYPTION, &mut encryption[..])
            .map_err(|err| CipherError::CorruptedKey(format!("hkdf expand failed: {err}")))?;
        hkdf.expand(HKDF_INFO_AUTHENTICATION, &mut authentication[..])
            .map_err(|err| CipherError::CorruptedKey(format!("hkdf expand failed: {err}")))?;
        Ok(SubKeys {
            encryption,
            authentication,
        })
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldKey")
            .field("material", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for FieldKey {
    fn eq(&self, other: &Self) -> bool {
        self.material.expose_secret()[..]
            .ct_eq(&other.material.expose_secret()[..])
            .into()
    }
}

impl Eq for FieldKey {}

pub(crate) struct SubKeys {
    pub(crate) encryption: Zeroizing<[u8; KEY_LENGTH]>,
    pub(crate) authentication: Zeroizing<[u8; KEY_LENGTH]>,
}

/// Process-wide creation locks, one per storage identifier.
fn creation_lock(identifier: &str) -> CipherResult<Arc<tokio::sync::Mutex<()>>> {
    static LOCKS: OnceLock<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>> = OnceLock::new();
    let mut locks = LOCKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .map_err(|_| CipherError::StorageUnavailable("key creation lock poisoned".to_string()))?;
    Ok(Arc::clone(
        locks
            .entry(identifier.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
    ))
}

/// Reads the installation key, creating and persisting it on first use.
pub(crate) struct KeyManager {
    store: Arc<dyn SecureKeyStore>,
    random: Arc<dyn RandomSource>,
    identifier: String,
}

impl KeyManager {
    pub(crate) fn new(
        store: Arc<dyn SecureKeyStore>,
        random: Arc<dyn RandomSource>,
        identifier: String,
    ) -> Self {
        Self {
            store,
            random,
            identifier,
        }
    }

    pub(crate) fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the stored key, or creates exactly one if the store is empty.
    ///
    /// Creation runs under the identifier's process-wide lock and persists
    /// through [`SecureKeyStore::insert_if_absent`], so racing callers (even in
    /// other processes sharing the store) all end up with the winner's key.
    pub(crate) async fn obtain_or_create(&self) -> CipherResult<FieldKey> {
        if let Some(stored) = self.read()? {
            return FieldKey::from_hex(&stored);
        }

        let lock = creation_lock(&self.identifier)?;
        let _guard = lock.lock().await;

        if let Some(stored) = self.read()? {
            return FieldKey::from_hex(&stored);
        }

        let candidate = FieldKey::generate(self.random.as_ref())?;
        let stored = Zeroizing::new(
            self.store
                .insert_if_absent(&self.identifier, &candidate.to_hex())?,
        );
        let key = FieldKey::from_hex(&stored)?;
        if key == candidate {
            log::debug!("created installation key under '{}'", self.identifier);
        } else {
            log::debug!(
                "installation key under '{}' was created concurrently, adopting it",
                self.identifier
            );
        }
        Ok(key)
    }

    fn read(&self) -> CipherResult<Option<Zeroizing<String>>> {
        Ok(self.store.get_item(&self.identifier)?.map(Zeroizing::new))
    }
}
