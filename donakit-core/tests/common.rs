#![allow(dead_code, missing_docs)]

//! Common test utilities shared across integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use donakit_core::secure_store::{
    InMemoryKeyStore, SecureKeyStore, SecureStoreError, SecureStoreResult,
};
use donakit_core::{
    CipherError, CipherResult, FieldCipher, FieldCipherConfig, OsRandomSource, RandomSource,
};
use uuid::Uuid;

/// In-memory store that counts how many keys were actually written.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryKeyStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn entries(&self) -> usize {
        self.inner.len().expect("len")
    }
}

impl SecureKeyStore for CountingStore {
    fn get_item(&self, identifier: &str) -> SecureStoreResult<Option<String>> {
        self.inner.get_item(identifier)
    }

    fn set_item(&self, identifier: &str, value: &str) -> SecureStoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_item(identifier, value)
    }

    fn delete_item(&self, identifier: &str) -> SecureStoreResult<()> {
        self.inner.delete_item(identifier)
    }

    fn insert_if_absent(&self, identifier: &str, value: &str) -> SecureStoreResult<String> {
        let stored = self.inner.insert_if_absent(identifier, value)?;
        if stored == value {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(stored)
    }
}

/// Store whose every call fails, like a locked keychain.
pub struct UnavailableStore;

impl SecureKeyStore for UnavailableStore {
    fn get_item(&self, _identifier: &str) -> SecureStoreResult<Option<String>> {
        Err(SecureStoreError::Unavailable("keychain locked".to_string()))
    }

    fn set_item(&self, _identifier: &str, _value: &str) -> SecureStoreResult<()> {
        Err(SecureStoreError::Unavailable("keychain locked".to_string()))
    }

    fn delete_item(&self, _identifier: &str) -> SecureStoreResult<()> {
        Err(SecureStoreError::Unavailable("keychain locked".to_string()))
    }

    fn insert_if_absent(&self, _identifier: &str, _value: &str) -> SecureStoreResult<String> {
        Err(SecureStoreError::Unavailable("keychain locked".to_string()))
    }
}

/// Random source that never produces bytes.
pub struct ExhaustedRandom;

impl RandomSource for ExhaustedRandom {
    fn fill(&self, _dest: &mut [u8]) -> CipherResult<()> {
        Err(CipherError::RandomSourceUnavailable(
            "entropy pool unavailable".to_string(),
        ))
    }
}

pub fn unique_identifier(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

pub fn cipher_over(store: Arc<dyn SecureKeyStore>, identifier: &str) -> FieldCipher {
    FieldCipher::with_components(
        store,
        Arc::new(OsRandomSource),
        FieldCipherConfig::new(identifier).expect("config"),
    )
}

pub fn fresh_cipher() -> FieldCipher {
    FieldCipher::new(Arc::new(InMemoryKeyStore::new()))
}
