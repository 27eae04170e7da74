//! Secure random byte source used for keys and IVs.

use rand::{rngs::OsRng, RngCore};

use crate::error::{CipherError, CipherResult};

/// Cryptographically secure random generator.
pub trait RandomSource: Send + Sync {
    /// Fills `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::RandomSourceUnavailable`] if the generator fails.
    fn fill(&self, dest: &mut [u8]) -> CipherResult<()>;
}

/// [`RandomSource`] drawing from the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn fill(&self, dest: &mut [u8]) -> CipherResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|err| CipherError::RandomSourceUnavailable(err.to_string()))
    }
}

pub(crate) fn random_array<const N: usize>(source: &dyn RandomSource) -> CipherResult<[u8; N]> {
    let mut bytes = [0u8; N];
    source.fill(&mut bytes)?;
    Ok(bytes)
}
