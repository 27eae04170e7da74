//! In-memory key store.
//!
//! NOT persistent and NOT protected by any hardware. Meant for tests and for
//! sessions that must not leave a key behind.

use std::collections::HashMap;
use std::sync::Mutex;

use super::error::{SecureStoreError, SecureStoreResult};
use super::traits::SecureKeyStore;

/// [`SecureKeyStore`] backed by a mutex-guarded `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    items: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal mutex is poisoned.
    pub fn len(&self) -> SecureStoreResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal mutex is poisoned.
    pub fn is_empty(&self) -> SecureStoreResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> SecureStoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| SecureStoreError::Unavailable("mutex poisoned".to_string()))
    }
}

impl SecureKeyStore for InMemoryKeyStore {
    fn get_item(&self, identifier: &str) -> SecureStoreResult<Option<String>> {
        Ok(self.lock()?.get(identifier).cloned())
    }

    fn set_item(&self, identifier: &str, value: &str) -> SecureStoreResult<()> {
        self.lock()?
            .insert(identifier.to_string(), value.to_string());
        Ok(())
    }

    fn delete_item(&self, identifier: &str) -> SecureStoreResult<()> {
        self.lock()?.remove(identifier);
        Ok(())
    }

    fn insert_if_absent(&self, identifier: &str, value: &str) -> SecureStoreResult<String> {
        Ok(self
            .lock()?
            .entry(identifier.to_string())
            .or_insert_with(|| value.to_string())
            .clone())
    }
}
