#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Field-level encryption at rest for the BAMX donation app.
//!
//! Sensitive profile attributes (name, email, phone, address, location) are
//! sealed into self-contained envelope strings before they are written to the
//! document store, and opened again after they are read back. The symmetric
//! key never leaves the device: it is created on first use and kept in a
//! platform secure store.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), donakit_core::CipherError> {
//! use std::sync::Arc;
//! use donakit_core::{secure_store::InMemoryKeyStore, FieldCipher};
//! use serde_json::json;
//!
//! let cipher = FieldCipher::new(Arc::new(InMemoryKeyStore::new()));
//! let envelope = cipher.encrypt(&json!({"latitude": 20.7295, "longitude": -103.3698})).await?;
//! let location = cipher.decrypt(&envelope).await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod config;
pub use config::*;

pub mod cipher;
pub use cipher::{DecryptedPayload, Envelope, FieldCipher, FieldKey, OsRandomSource, RandomSource};

pub mod logger;
pub mod profile;
pub mod secure_store;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("donakit_core");
