//! File-backed key store for desktop builds and local development.
//!
//! Less secure than a hardware-backed keystore: the key sits in a file only
//! protected by filesystem permissions (`0600` on Unix). Each identifier maps
//! to its own file; writes go through a temp file and an atomic rename, and
//! every mutation holds the directory lock so concurrent processes agree on a
//! single key.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::error::{SecureStoreError, SecureStoreResult};
use super::lock::{StoreLock, StoreLockGuard};
use super::traits::SecureKeyStore;

const LOCK_FILENAME: &str = "store.lock";
const ITEM_EXTENSION: &str = "item";

/// [`SecureKeyStore`] persisting one file per identifier under a root directory.
#[derive(Debug)]
pub struct FileKeyStore {
    root: PathBuf,
    lock: StoreLock,
    // flock is per open file description, so threads sharing this handle
    // need their own exclusion.
    writer: Mutex<()>,
}

impl FileKeyStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or its lock file cannot be created.
    pub fn open(root: impl AsRef<Path>) -> SecureStoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let lock = StoreLock::open(&root.join(LOCK_FILENAME))?;
        Ok(Self {
            root,
            lock,
            writer: Mutex::new(()),
        })
    }

    /// Directory holding the item files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifiers are hex-encoded so arbitrary strings never escape `root`.
    fn item_path(&self, identifier: &str) -> PathBuf {
        self.root
            .join(format!("{}.{ITEM_EXTENSION}", hex::encode(identifier)))
    }

    fn exclusive(&self) -> SecureStoreResult<(MutexGuard<'_, ()>, StoreLockGuard)> {
        let local = self
            .writer
            .lock()
            .map_err(|_| SecureStoreError::Lock("mutex poisoned".to_string()))?;
        let file = self.lock.lock()?;
        Ok((local, file))
    }

    fn read(&self, identifier: &str) -> SecureStoreResult<Option<String>> {
        match fs::read_to_string(self.item_path(identifier)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_atomic(&self, identifier: &str, value: &str) -> SecureStoreResult<()> {
        let target = self.item_path(identifier);
        let staging = target.with_extension("tmp");
        {
            let mut file = create_private(&staging)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&staging, &target).map_err(|err| {
            let _ = fs::remove_file(&staging);
            SecureStoreError::Io(format!("rename into {}: {err}", target.display()))
        })
    }
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl SecureKeyStore for FileKeyStore {
    fn get_item(&self, identifier: &str) -> SecureStoreResult<Option<String>> {
        self.read(identifier)
    }

    fn set_item(&self, identifier: &str, value: &str) -> SecureStoreResult<()> {
        let _guard = self.exclusive()?;
        self.write_atomic(identifier, value)
    }

    fn delete_item(&self, identifier: &str) -> SecureStoreResult<()> {
        let _guard = self.exclusive()?;
        match fs::remove_file(self.item_path(identifier)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn insert_if_absent(&self, identifier: &str, value: &str) -> SecureStoreResult<String> {
        let _guard = self.exclusive()?;
        if let Some(existing) = self.read(identifier)? {
            return Ok(existing);
        }
        self.write_atomic(identifier, value)?;
        Ok(value.to_string())
    }
}
