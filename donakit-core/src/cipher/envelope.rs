//! Envelope serialization: the single string persisted per encrypted field.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::IV_LENGTH;
use crate::error::{CipherError, CipherResult};

/// Output of one encryption call.
///
/// Serialized as `{"initializationVector": "<32 hex chars>", "data": "<base64>"}`.
/// `data` holds the ciphertext followed by its authentication tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Hex-encoded 16-byte IV drawn for this envelope only.
    pub initialization_vector: String,
    /// Base64 of `ciphertext || tag`.
    pub data: String,
}

impl Envelope {
    pub(crate) fn new(iv: &[u8; IV_LENGTH], sealed: &[u8]) -> Self {
        Self {
            initialization_vector: hex::encode(iv),
            data: STANDARD.encode(sealed),
        }
    }

    /// Decodes envelope text read back from the document store.
    ///
    /// # Errors
    ///
    /// - [`CipherError::InvalidInput`] if `text` is empty.
    /// - [`CipherError::MalformedEnvelope`] if `text` is not a JSON object with
    ///   string fields `initializationVector` and `data`.
    pub fn parse(text: &str) -> CipherResult<Self> {
        if text.is_empty() {
            return Err(CipherError::InvalidInput(
                "no encrypted data provided".to_string(),
            ));
        }
        let value: Value = serde_json::from_str(text)
            .map_err(|err| CipherError::MalformedEnvelope(format!("not json: {err}")))?;
        if !value.is_object() {
            return Err(CipherError::MalformedEnvelope(
                "envelope is not a json object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|err| CipherError::MalformedEnvelope(err.to_string()))
    }

    /// Serializes the envelope into its persisted string form.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::EncryptionFailure`] if serialization fails.
    pub fn to_json(&self) -> CipherResult<String> {
        serde_json::to_string(self)
            .map_err(|err| CipherError::EncryptionFailure(format!("envelope serialization: {err}")))
    }

    pub(crate) fn iv(&self) -> CipherResult<[u8; IV_LENGTH]> {
        let bytes = hex::decode(&self.initialization_vector).map_err(|err| {
            CipherError::DecryptionFailure(format!("initialization vector is not hex: {err}"))
        })?;
        bytes.try_into().map_err(|bytes: Vec<u8>| {
            CipherError::DecryptionFailure(format!(
                "initialization vector length mismatch: expected {IV_LENGTH}, got {}",
                bytes.len()
            ))
        })
    }

    pub(crate) fn sealed(&self) -> CipherResult<Vec<u8>> {
        STANDARD
            .decode(&self.data)
            .map_err(|err| CipherError::DecryptionFailure(format!("data is not base64: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_wire_field_names() {
        let envelope = Envelope::new(&[0xAB; IV_LENGTH], &[1, 2, 3]);
        let json = envelope.to_json().expect("serialize");
        assert_eq!(
            json,
            r#"{"initializationVector":"abababababababababababababababab","data":"AQID"}"#
        );
        assert_eq!(Envelope::parse(&json).expect("parse"), envelope);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let parsed = Envelope::parse(
            r#"{"initializationVector":"00000000000000000000000000000000","data":"AA==","v":2}"#,
        )
        .expect("parse");
        assert_eq!(parsed.data, "AA==");
    }

    #[test_case("not json" ; "not json")]
    #[test_case(r#"{"foo":1}"# ; "unrelated object")]
    #[test_case(r#"{"initializationVector":"00"}"# ; "missing data")]
    #[test_case(r#"{"initializationVector":7,"data":"AA=="}"# ; "numeric iv")]
    #[test_case(r#"["00000000000000000000000000000000","AA=="]"# ; "array")]
    #[test_case(r#""just a string""# ; "json string")]
    #[test_case(" " ; "whitespace")]
    fn test_structural_errors_are_malformed(text: &str) {
        assert!(matches!(
            Envelope::parse(text),
            Err(CipherError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_empty_envelope_is_invalid_input() {
        assert!(matches!(
            Envelope::parse(""),
            Err(CipherError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_bad_field_contents_are_decryption_failures() {
        let short_iv = Envelope {
            initialization_vector: "abcd".to_string(),
            data: "AA==".to_string(),
        };
        assert!(matches!(short_iv.iv(), Err(CipherError::DecryptionFailure(_))));

        let bad_base64 = Envelope {
            initialization_vector: "00".repeat(IV_LENGTH),
            data: "***".to_string(),
        };
        assert!(matches!(
            bad_base64.sealed(),
            Err(CipherError::DecryptionFailure(_))
        ));
    }
}
