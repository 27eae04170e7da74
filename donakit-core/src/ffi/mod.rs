//! `UniFFI` surface for the Swift and Kotlin apps.
//!
//! The host supplies its Keychain / Keystore wrapper as a
//! [`ForeignSecureStore`] and drives encryption through [`FieldEncryptor`].

mod encryptor;
mod store;

pub use encryptor::{DecryptedData, FieldEncryptor};
pub use store::{ForeignKeyStore, ForeignSecureStore, ForeignStoreError};
