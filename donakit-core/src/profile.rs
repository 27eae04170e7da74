//! Donor profile documents with their sensitive attributes sealed.
//!
//! Name, email and phone are encrypted as raw text, the address as
//! `{"address": ...}` and the location as `{"latitude": .., "longitude": ..}`.
//! The account type stays in clear: listings filter on it.

use serde::{Deserialize, Serialize};

use crate::cipher::FieldCipher;
use crate::error::{CipherError, CipherResult};

/// Role an account signs up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Staff of the food bank.
    #[serde(rename = "food bank staff")]
    FoodBankStaff,
    /// A company donating in bulk. Companies register a location.
    #[serde(rename = "donor company")]
    DonorCompany,
    /// An individual donor.
    #[serde(rename = "regular donor")]
    RegularDonor,
}

impl AccountType {
    /// Document representation of the account type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FoodBankStaff => "food bank staff",
            Self::DonorCompany => "donor company",
            Self::RegularDonor => "regular donor",
        }
    }
}

/// A pickup location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude, `-90.0..=90.0`.
    pub latitude: f64,
    /// Longitude, `-180.0..=180.0`.
    pub longitude: f64,
}

impl Location {
    fn validate(&self) -> CipherResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CipherError::InvalidInput(
                "location is outside valid coordinate ranges".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct AddressPayload {
    address: String,
}

/// Profile data as entered at sign-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorProfile {
    /// Display name.
    pub nombre: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Account role.
    pub account_type: AccountType,
    /// Street address, if given.
    pub address: Option<String>,
    /// Pickup location, if given.
    pub location: Option<Location>,
}

/// Profile as written to the document store: one envelope per sensitive field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedProfile {
    /// Envelope of the display name.
    pub nombre: String,
    /// Envelope of the email.
    pub email: String,
    /// Envelope of the phone.
    pub phone: String,
    /// Account role, in clear.
    pub account_type: AccountType,
    /// Envelope of the address payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Envelope of the location payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<String>,
}

/// Result of opening an [`EncryptedProfile`]; every field fails on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct DecryptedProfile {
    /// Display name.
    pub nombre: CipherResult<String>,
    /// Contact email.
    pub email: CipherResult<String>,
    /// Contact phone.
    pub phone: CipherResult<String>,
    /// Account role.
    pub account_type: AccountType,
    /// Street address, when the document has one.
    pub address: Option<CipherResult<String>>,
    /// Pickup location, when the document has one.
    pub location: Option<CipherResult<Location>>,
}

impl DecryptedProfile {
    /// Whether the profile can be shown in a donor list: at least the name or
    /// the email decrypted.
    #[must_use]
    pub const fn is_listable(&self) -> bool {
        self.nombre.is_ok() || self.email.is_ok()
    }
}

/// Seals the sensitive fields of `profile`.
///
/// # Errors
///
/// [`CipherError::InvalidInput`] if name, email or phone is empty (checked
/// before anything is encrypted), otherwise any error of
/// [`FieldCipher::encrypt`].
pub async fn encrypt_profile(
    cipher: &FieldCipher,
    profile: &DonorProfile,
) -> CipherResult<EncryptedProfile> {
    for (field, value) in [
        ("nombre", &profile.nombre),
        ("email", &profile.email),
        ("phone", &profile.phone),
    ] {
        if value.trim().is_empty() {
            return Err(CipherError::InvalidInput(format!("{field} is required")));
        }
    }

    let address = match &profile.address {
        Some(address) => Some(encrypt_address(cipher, address).await?),
        None => None,
    };
    let ubicacion = match &profile.location {
        Some(location) => Some(encrypt_location(cipher, location).await?),
        None => None,
    };

    Ok(EncryptedProfile {
        nombre: cipher.encrypt_text(&profile.nombre).await?,
        email: cipher.encrypt_text(&profile.email).await?,
        phone: cipher.encrypt_text(&profile.phone).await?,
        account_type: profile.account_type,
        address,
        ubicacion,
    })
}

/// Opens every sealed field of `encrypted` independently.
pub async fn decrypt_profile(cipher: &FieldCipher, encrypted: &EncryptedProfile) -> DecryptedProfile {
    let nombre = lenient("nombre", cipher.decrypt_text(&encrypted.nombre).await);
    let email = lenient("email", cipher.decrypt_text(&encrypted.email).await);
    let phone = lenient("phone", cipher.decrypt_text(&encrypted.phone).await);

    let address = match &encrypted.address {
        Some(envelope) => Some(lenient("address", decrypt_address(cipher, envelope).await)),
        None => None,
    };
    let location = match &encrypted.ubicacion {
        Some(envelope) => Some(lenient("ubicacion", decrypt_location(cipher, envelope).await)),
        None => None,
    };

    DecryptedProfile {
        nombre,
        email,
        phone,
        account_type: encrypted.account_type,
        address,
        location,
    }
}

fn lenient<T>(field: &str, result: CipherResult<T>) -> CipherResult<T> {
    if let Err(err) = &result {
        log::warn!("could not decrypt profile field '{field}': {err}");
    }
    result
}

/// Seals a location as `{"latitude": .., "longitude": ..}`.
///
/// # Errors
///
/// [`CipherError::InvalidInput`] for coordinates out of range or not finite,
/// otherwise any error of [`FieldCipher::encrypt`].
pub async fn encrypt_location(cipher: &FieldCipher, location: &Location) -> CipherResult<String> {
    location.validate()?;
    cipher.encrypt_serialized(location).await
}

/// Opens an envelope produced by [`encrypt_location`].
///
/// # Errors
///
/// [`CipherError::UnexpectedPayload`] if the payload is not a location,
/// otherwise any error of [`FieldCipher::decrypt`].
pub async fn decrypt_location(cipher: &FieldCipher, envelope: &str) -> CipherResult<Location> {
    cipher.decrypt_deserialized(envelope).await
}

/// Seals a street address as `{"address": ...}`.
///
/// # Errors
///
/// [`CipherError::InvalidInput`] for an empty address, otherwise any error of
/// [`FieldCipher::encrypt`].
pub async fn encrypt_address(cipher: &FieldCipher, address: &str) -> CipherResult<String> {
    if address.trim().is_empty() {
        return Err(CipherError::InvalidInput("address is empty".to_string()));
    }
    let payload = AddressPayload {
        address: address.to_string(),
    };
    cipher.encrypt_serialized(&payload).await
}

/// Opens an envelope produced by [`encrypt_address`].
///
/// # Errors
///
/// [`CipherError::UnexpectedPayload`] if the payload is not an address object,
/// otherwise any error of [`FieldCipher::decrypt`].
pub async fn decrypt_address(cipher: &FieldCipher, envelope: &str) -> CipherResult<String> {
    cipher
        .decrypt_deserialized::<AddressPayload>(envelope)
        .await
        .map(|payload| payload.address)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::FieldCipherConfig;
    use crate::secure_store::InMemoryKeyStore;
    use crate::OsRandomSource;

    fn cipher(identifier: &str) -> FieldCipher {
        FieldCipher::with_components(
            Arc::new(InMemoryKeyStore::new()),
            Arc::new(OsRandomSource),
            FieldCipherConfig::new(identifier).expect("config"),
        )
    }

    fn company() -> DonorProfile {
        DonorProfile {
            nombre: "Abarrotes La Esperanza".to_string(),
            email: "contacto@esperanza.mx".to_string(),
            phone: "3312345678".to_string(),
            account_type: AccountType::DonorCompany,
            address: Some("Calle Morelos 210, Zapopan".to_string()),
            location: Some(Location {
                latitude: 20.7295,
                longitude: -103.3698,
            }),
        }
    }

    #[test]
    fn test_account_type_document_strings() {
        assert_eq!(
            serde_json::to_string(&AccountType::FoodBankStaff).expect("serialize"),
            "\"food bank staff\""
        );
        let parsed: AccountType = serde_json::from_str("\"regular donor\"").expect("parse");
        assert_eq!(parsed, AccountType::RegularDonor);
        assert_eq!(AccountType::DonorCompany.as_str(), "donor company");
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let cipher = cipher("profile-round-trip");
        let profile = company();

        let encrypted = encrypt_profile(&cipher, &profile).await.expect("encrypt");
        assert_ne!(encrypted.nombre, profile.nombre);
        assert!(encrypted.ubicacion.is_some());

        let decrypted = decrypt_profile(&cipher, &encrypted).await;
        assert_eq!(decrypted.nombre.as_deref(), Ok("Abarrotes La Esperanza"));
        // Digits-only phones stay text.
        assert_eq!(decrypted.phone.as_deref(), Ok("3312345678"));
        assert_eq!(
            decrypted.address,
            Some(Ok("Calle Morelos 210, Zapopan".to_string()))
        );
        assert_eq!(decrypted.location, Some(Ok(profile.location.expect("loc"))));
        assert!(decrypted.is_listable());
    }

    #[tokio::test]
    async fn test_required_fields_are_checked_first() {
        let cipher = cipher("profile-required");
        let mut profile = company();
        profile.phone = "  ".to_string();

        let err = encrypt_profile(&cipher, &profile).await.expect_err("empty phone");
        assert_eq!(err, CipherError::InvalidInput("phone is required".to_string()));
    }

    #[tokio::test]
    async fn test_document_field_names() {
        let cipher = cipher("profile-document");
        let mut profile = company();
        profile.account_type = AccountType::RegularDonor;
        profile.location = None;

        let encrypted = encrypt_profile(&cipher, &profile).await.expect("encrypt");
        let document = serde_json::to_value(&encrypted).expect("document");
        let object = document.as_object().expect("object");
        assert_eq!(object["accountType"], "regular donor");
        assert!(object.contains_key("address"));
        assert!(!object.contains_key("ubicacion"));
    }

    #[tokio::test]
    async fn test_one_bad_field_does_not_hide_the_others() {
        let cipher = cipher("profile-lenient");
        let mut encrypted = encrypt_profile(&cipher, &company()).await.expect("encrypt");
        encrypted.nombre = "not json".to_string();

        let decrypted = decrypt_profile(&cipher, &encrypted).await;
        assert!(matches!(
            decrypted.nombre,
            Err(CipherError::MalformedEnvelope(_))
        ));
        assert_eq!(decrypted.email.as_deref(), Ok("contacto@esperanza.mx"));
        assert!(decrypted.is_listable());

        encrypted.email = String::new();
        let decrypted = decrypt_profile(&cipher, &encrypted).await;
        assert!(!decrypted.is_listable());
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_unexpected_payload() {
        let cipher = cipher("profile-shape");
        let address = encrypt_address(&cipher, "Av. Vallarta 3000").await.expect("encrypt");

        assert!(matches!(
            decrypt_location(&cipher, &address).await,
            Err(CipherError::UnexpectedPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_location_is_rejected() {
        let cipher = cipher("profile-range");
        let location = Location {
            latitude: 120.0,
            longitude: 0.0,
        };
        assert!(matches!(
            encrypt_location(&cipher, &location).await,
            Err(CipherError::InvalidInput(_))
        ));
        let location = Location {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        assert!(matches!(
            encrypt_location(&cipher, &location).await,
            Err(CipherError::InvalidInput(_))
        ));
    }
}
