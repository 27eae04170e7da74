//! Exclusive file lock serializing key-store writers across processes.
//!
//! Native targets use `flock` (Unix) or `LockFileEx` (Windows). On wasm the
//! runtime is a single-threaded worker and the lock is a no-op.

use std::path::Path;

use super::error::{SecureStoreError, SecureStoreResult};

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::{Path, SecureStoreResult};

    /// No-op store lock for wasm.
    #[derive(Debug, Clone)]
    pub struct StoreLock;

    /// No-op lock guard.
    #[derive(Debug)]
    pub struct StoreLockGuard;

    impl StoreLock {
        /// Opens the lock; nothing is created on wasm.
        ///
        /// # Errors
        ///
        /// Never fails on wasm.
        pub const fn open(_path: &Path) -> SecureStoreResult<Self> {
            Ok(Self)
        }

        /// Acquires the lock.
        ///
        /// # Errors
        ///
        /// Never fails on wasm.
        pub const fn lock(&self) -> SecureStoreResult<StoreLockGuard> {
            Ok(StoreLockGuard)
        }

        #[cfg(test)]
        pub(crate) const fn try_lock(&self) -> SecureStoreResult<Option<StoreLockGuard>> {
            Ok(Some(StoreLockGuard))
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::{Path, SecureStoreError, SecureStoreResult};
    use std::fs::{self, File, OpenOptions};
    use std::sync::Arc;

    /// Lock file guarding a key store directory.
    #[derive(Debug, Clone)]
    pub struct StoreLock {
        file: Arc<File>,
    }

    /// Holds the exclusive lock until dropped.
    #[derive(Debug)]
    pub struct StoreLockGuard {
        file: Arc<File>,
    }

    impl StoreLock {
        /// Opens or creates the lock file at `path`, creating parent directories.
        ///
        /// # Errors
        ///
        /// Returns an error if the file cannot be opened or created.
        pub fn open(path: &Path) -> SecureStoreResult<Self> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|err| lock_err(&err))?;
            }
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)
                .map_err(|err| lock_err(&err))?;
            Ok(Self {
                file: Arc::new(file),
            })
        }

        /// Blocks until the exclusive lock is held.
        ///
        /// # Errors
        ///
        /// Returns an error if the operating system refuses the lock.
        pub fn lock(&self) -> SecureStoreResult<StoreLockGuard> {
            sys::acquire(&self.file, true).map_err(|err| lock_err(&err))?;
            Ok(self.guard())
        }

        /// Takes the lock if it is free, returns `None` if another holder has it.
        #[cfg(test)]
        pub(crate) fn try_lock(&self) -> SecureStoreResult<Option<StoreLockGuard>> {
            let acquired = sys::acquire(&self.file, false).map_err(|err| lock_err(&err))?;
            Ok(acquired.then(|| self.guard()))
        }

        fn guard(&self) -> StoreLockGuard {
            StoreLockGuard {
                file: Arc::clone(&self.file),
            }
        }
    }

    impl Drop for StoreLockGuard {
        fn drop(&mut self) {
            let _ = sys::release(&self.file);
        }
    }

    fn lock_err(err: &std::io::Error) -> SecureStoreError {
        SecureStoreError::Lock(err.to_string())
    }

    #[cfg(unix)]
    mod sys {
        use std::fs::File;
        use std::io;
        use std::os::raw::c_int;
        use std::os::unix::io::AsRawFd;

        const LOCK_EX: c_int = 2;
        const LOCK_NB: c_int = 4;
        const LOCK_UN: c_int = 8;

        extern "C" {
            fn flock(fd: c_int, operation: c_int) -> c_int;
        }

        /// Returns `Ok(false)` only for a non-blocking attempt on a held lock.
        pub fn acquire(file: &File, blocking: bool) -> io::Result<bool> {
            let operation = if blocking { LOCK_EX } else { LOCK_EX | LOCK_NB };
            // SAFETY: the descriptor is owned by `file` and stays open for the call.
            if unsafe { flock(file.as_raw_fd(), operation) } == 0 {
                return Ok(true);
            }
            let err = io::Error::last_os_error();
            if !blocking && err.kind() == io::ErrorKind::WouldBlock {
                Ok(false)
            } else {
                Err(err)
            }
        }

        pub fn release(file: &File) -> io::Result<()> {
            // SAFETY: see `acquire`.
            if unsafe { flock(file.as_raw_fd(), LOCK_UN) } == 0 {
                Ok(())
            } else {
                Err(io::Error::last_os_error())
            }
        }
    }

    #[cfg(windows)]
    mod sys {
        use std::fs::File;
        use std::io;
        use std::os::windows::io::AsRawHandle;

        type Handle = *mut std::ffi::c_void;

        #[repr(C)]
        struct Overlapped {
            internal: usize,
            internal_high: usize,
            offset: u32,
            offset_high: u32,
            h_event: Handle,
        }

        const LOCKFILE_FAIL_IMMEDIATELY: u32 = 0x1;
        const LOCKFILE_EXCLUSIVE_LOCK: u32 = 0x2;
        const ERROR_LOCK_VIOLATION: i32 = 33;

        extern "system" {
            fn LockFileEx(
                h_file: Handle,
                flags: u32,
                reserved: u32,
                bytes_low: u32,
                bytes_high: u32,
                overlapped: *mut Overlapped,
            ) -> i32;
            fn UnlockFileEx(
                h_file: Handle,
                reserved: u32,
                bytes_low: u32,
                bytes_high: u32,
                overlapped: *mut Overlapped,
            ) -> i32;
        }

        pub fn acquire(file: &File, blocking: bool) -> io::Result<bool> {
            let mut flags = LOCKFILE_EXCLUSIVE_LOCK;
            if !blocking {
                flags |= LOCKFILE_FAIL_IMMEDIATELY;
            }
            let handle = file.as_raw_handle() as Handle;
            // SAFETY: `Overlapped` is plain data and all-zero is its documented initial state.
            let mut overlapped: Overlapped = unsafe { std::mem::zeroed() };
            // SAFETY: the handle is owned by `file` and outlives the call.
            if unsafe { LockFileEx(handle, flags, 0, 1, 0, &mut overlapped) } != 0 {
                return Ok(true);
            }
            let err = io::Error::last_os_error();
            if !blocking && err.raw_os_error() == Some(ERROR_LOCK_VIOLATION) {
                Ok(false)
            } else {
                Err(err)
            }
        }

        pub fn release(file: &File) -> io::Result<()> {
            let handle = file.as_raw_handle() as Handle;
            // SAFETY: see `acquire`.
            let mut overlapped: Overlapped = unsafe { std::mem::zeroed() };
            // SAFETY: see `acquire`.
            if unsafe { UnlockFileEx(handle, 0, 1, 0, &mut overlapped) } != 0 {
                Ok(())
            } else {
                Err(io::Error::last_os_error())
            }
        }
    }
}

pub use imp::{StoreLock, StoreLockGuard};
