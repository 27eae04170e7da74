//! Device-local secret storage used to keep the installation key.
//!
//! The cipher only needs string get/set semantics plus an atomic
//! insert-if-absent, so any platform store fits behind [`SecureKeyStore`]:
//! - iOS: Keychain Services (`kSecAttrAccessibleAfterFirstUnlockThisDeviceOnly`)
//! - Android: `EncryptedSharedPreferences` backed by the Android Keystore
//! - Desktop/dev: [`FileKeyStore`]
//! - Tests: [`InMemoryKeyStore`]

mod error;
mod file;
mod lock;
mod memory;
mod traits;

pub use error::{SecureStoreError, SecureStoreResult};
pub use file::FileKeyStore;
pub use lock::{StoreLock, StoreLockGuard};
pub use memory::InMemoryKeyStore;
pub use traits::SecureKeyStore;
