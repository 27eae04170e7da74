//! Platform interface for the installation key store.

use super::error::SecureStoreResult;

/// At-rest secret storage keyed by a string identifier.
///
/// Implementations must be safe to call from several threads at once. Values
/// are opaque UTF-8 strings; the cipher stores its key hex-encoded.
pub trait SecureKeyStore: Send + Sync {
    /// Returns the value stored under `identifier`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_item(&self, identifier: &str) -> SecureStoreResult<Option<String>>;

    /// Stores `value` under `identifier`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set_item(&self, identifier: &str, value: &str) -> SecureStoreResult<()>;

    /// Removes the value stored under `identifier`. Missing entries are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn delete_item(&self, identifier: &str) -> SecureStoreResult<()>;

    /// Stores `value` only if nothing is stored under `identifier` yet.
    ///
    /// The check and the write must be a single atomic step with respect to
    /// every other writer of the same store. Returns the value that is stored
    /// once the call completes: `value` if it was inserted, the existing entry
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    fn insert_if_absent(&self, identifier: &str, value: &str) -> SecureStoreResult<String>;
}
