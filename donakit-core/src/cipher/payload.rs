//! Plaintext canonicalization before encryption and decoding after it.

use serde_json::Value;
use zeroize::Zeroizing;

use crate::error::{CipherError, CipherResult};

/// Turns a payload into the text that gets encrypted.
///
/// Strings pass through untouched; every other value is JSON-serialized.
/// `null` and `""` are refused: absence is never encrypted.
pub(crate) fn canonicalize(payload: &Value) -> CipherResult<Zeroizing<String>> {
    match payload {
        Value::Null => Err(CipherError::InvalidInput(
            "cannot encrypt a null value".to_string(),
        )),
        Value::String(text) => canonical_text(text),
        structured => serde_json::to_string(structured)
            .map(Zeroizing::new)
            .map_err(|err| CipherError::EncryptionFailure(format!("payload serialization: {err}"))),
    }
}

pub(crate) fn canonical_text(text: &str) -> CipherResult<Zeroizing<String>> {
    if text.is_empty() {
        return Err(CipherError::InvalidInput(
            "cannot encrypt an empty string".to_string(),
        ));
    }
    Ok(Zeroizing::new(text.to_string()))
}

/// What a decrypted envelope turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum DecryptedPayload {
    /// The plaintext parsed as JSON.
    Structured(Value),
    /// The plaintext is not JSON and is returned verbatim.
    PlainText(String),
}

impl DecryptedPayload {
    /// Parses `text` as JSON, falling back to the raw text.
    #[must_use]
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::PlainText(text),
        }
    }

    /// Collapses both variants into one JSON value; plain text becomes a JSON string.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Structured(value) => value,
            Self::PlainText(text) => Value::String(text),
        }
    }

    /// `true` when the plaintext parsed as JSON.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}
