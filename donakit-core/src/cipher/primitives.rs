//! AES-256-CBC with PKCS#7 padding, authenticated with HMAC-SHA256.
//!
//! Sealed layout: `ciphertext || tag`, where
//! `tag = HMAC-SHA256(K_mac, iv || ciphertext)`. The tag is verified before
//! any block is decrypted.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::config::{IV_LENGTH, TAG_LENGTH};
use crate::error::{CipherError, CipherResult};

use super::key::SubKeys;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

const BLOCK_SIZE: usize = 16;

pub(crate) fn seal(
    keys: &SubKeys,
    iv: &[u8; IV_LENGTH],
    plaintext: &[u8],
) -> CipherResult<Vec<u8>> {
    let encryptor = Aes256CbcEnc::new_from_slices(&keys.encryption[..], iv)
        .map_err(|err| CipherError::EncryptionFailure(format!("aes-256-cbc init: {err}")))?;
    let mut sealed = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let tag = authenticator(keys, iv, &sealed)
        .map_err(|err| CipherError::EncryptionFailure(format!("hmac init: {err}")))?
        .finalize()
        .into_bytes();
    sealed.extend_from_slice(&tag);
    Ok(sealed)
}

pub(crate) fn open(
    keys: &SubKeys,
    iv: &[u8; IV_LENGTH],
    sealed: &[u8],
) -> CipherResult<Zeroizing<Vec<u8>>> {
    let Some(body_len) = sealed.len().checked_sub(TAG_LENGTH) else {
        return Err(CipherError::DecryptionFailure(
            "ciphertext shorter than authentication tag".to_string(),
        ));
    };
    if body_len == 0 || body_len % BLOCK_SIZE != 0 {
        return Err(CipherError::DecryptionFailure(format!(
            "ciphertext length {body_len} is not a positive multiple of {BLOCK_SIZE}"
        )));
    }
    let (ciphertext, tag) = sealed.split_at(body_len);

    authenticator(keys, iv, ciphertext)
        .map_err(|err| CipherError::DecryptionFailure(format!("hmac init: {err}")))?
        .verify_slice(tag)
        .map_err(|_| CipherError::DecryptionFailure("authentication tag mismatch".to_string()))?;

    let decryptor = Aes256CbcDec::new_from_slices(&keys.encryption[..], iv)
        .map_err(|err| CipherError::DecryptionFailure(format!("aes-256-cbc init: {err}")))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CipherError::DecryptionFailure("padding check failed".to_string()))
}

fn authenticator(
    keys: &SubKeys,
    iv: &[u8; IV_LENGTH],
    ciphertext: &[u8],
) -> Result<HmacSha256, hmac::digest::InvalidLength> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(&keys.authentication[..])?;
    mac.update(iv);
    mac.update(ciphertext);
    Ok(mac)
}
