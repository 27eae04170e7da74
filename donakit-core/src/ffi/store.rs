//! Foreign secure store callback and its adapter to [`SecureKeyStore`].

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::secure_store::{SecureKeyStore, SecureStoreError, SecureStoreResult};

/// Errors a foreign secure store may report.
#[derive(Debug, Error, uniffi::Error)]
pub enum ForeignStoreError {
    /// The platform store refused or failed the operation.
    #[error("secure store unavailable: {0}")]
    Unavailable(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for ForeignStoreError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

impl From<ForeignStoreError> for SecureStoreError {
    fn from(error: ForeignStoreError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

/// Platform secret storage (iOS Keychain, Android Keystore-backed prefs).
#[uniffi::export(with_foreign)]
pub trait ForeignSecureStore: Send + Sync {
    /// Returns the value stored under `identifier`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform store cannot be read.
    fn get_item(&self, identifier: String) -> Result<Option<String>, ForeignStoreError>;

    /// Stores `value` under `identifier`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform store cannot be written.
    fn set_item(&self, identifier: String, value: String) -> Result<(), ForeignStoreError>;

    /// Removes the value stored under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform store cannot be written.
    fn delete_item(&self, identifier: String) -> Result<(), ForeignStoreError>;
}

/// Adapts a [`ForeignSecureStore`] to [`SecureKeyStore`].
///
/// Platform stores have no compare-and-set, so writes through one adapter are
/// serialized in-process. App sandboxes give each installation a single process.
pub struct ForeignKeyStore {
    inner: Arc<dyn ForeignSecureStore>,
    writer: Mutex<()>,
}

impl ForeignKeyStore {
    /// Wraps a host-provided store.
    #[must_use]
    pub fn new(inner: Arc<dyn ForeignSecureStore>) -> Self {
        Self {
            inner,
            writer: Mutex::new(()),
        }
    }

    fn exclusive(&self) -> SecureStoreResult<std::sync::MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| SecureStoreError::Lock("foreign store writer poisoned".to_string()))
    }
}

impl SecureKeyStore for ForeignKeyStore {
    fn get_item(&self, identifier: &str) -> SecureStoreResult<Option<String>> {
        Ok(self.inner.get_item(identifier.to_string())?)
    }

    fn set_item(&self, identifier: &str, value: &str) -> SecureStoreResult<()> {
        let _guard = self.exclusive()?;
        Ok(self
            .inner
            .set_item(identifier.to_string(), value.to_string())?)
    }

    fn delete_item(&self, identifier: &str) -> SecureStoreResult<()> {
        let _guard = self.exclusive()?;
        Ok(self.inner.delete_item(identifier.to_string())?)
    }

    fn insert_if_absent(&self, identifier: &str, value: &str) -> SecureStoreResult<String> {
        let _guard = self.exclusive()?;
        if let Some(existing) = self.inner.get_item(identifier.to_string())? {
            return Ok(existing);
        }
        self.inner
            .set_item(identifier.to_string(), value.to_string())?;
        Ok(value.to_string())
    }
}

impl std::fmt::Debug for ForeignKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignKeyStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub(crate) struct MapStore {
        pub(crate) items: Mutex<HashMap<String, String>>,
    }

    impl ForeignSecureStore for MapStore {
        fn get_item(&self, identifier: String) -> Result<Option<String>, ForeignStoreError> {
            Ok(self.items.lock().expect("items").get(&identifier).cloned())
        }

        fn set_item(&self, identifier: String, value: String) -> Result<(), ForeignStoreError> {
            self.items.lock().expect("items").insert(identifier, value);
            Ok(())
        }

        fn delete_item(&self, identifier: String) -> Result<(), ForeignStoreError> {
            self.items.lock().expect("items").remove(&identifier);
            Ok(())
        }
    }

    struct LockedKeychain;

    impl ForeignSecureStore for LockedKeychain {
        fn get_item(&self, _identifier: String) -> Result<Option<String>, ForeignStoreError> {
            Err(ForeignStoreError::Unavailable("device locked".to_string()))
        }

        fn set_item(&self, _identifier: String, _value: String) -> Result<(), ForeignStoreError> {
            Err(ForeignStoreError::Unavailable("device locked".to_string()))
        }

        fn delete_item(&self, _identifier: String) -> Result<(), ForeignStoreError> {
            Err(ForeignStoreError::Unavailable("device locked".to_string()))
        }
    }

    #[test]
    fn test_insert_if_absent_keeps_first_value() {
        let store = ForeignKeyStore::new(Arc::new(MapStore::default()));
        assert_eq!(store.insert_if_absent("k", "first").expect("insert"), "first");
        assert_eq!(store.insert_if_absent("k", "second").expect("insert"), "first");
        store.delete_item("k").expect("delete");
        assert_eq!(store.get_item("k").expect("get"), None);
    }

    #[test]
    fn test_foreign_errors_become_unavailable() {
        let store = ForeignKeyStore::new(Arc::new(LockedKeychain));
        match store.get_item("k") {
            Err(SecureStoreError::Unavailable(message)) => {
                assert!(message.contains("device locked"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
