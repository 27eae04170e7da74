//! Integration tests for profile and location encryption helpers.

mod common;

use common::fresh_cipher;
use donakit_core::profile::{
    decrypt_location, decrypt_profile, encrypt_location, encrypt_profile, AccountType,
    DonorProfile, EncryptedProfile, Location,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn donor(nombre: &str, email: &str) -> DonorProfile {
    DonorProfile {
        nombre: nombre.to_string(),
        email: email.to_string(),
        phone: "3398765432".to_string(),
        account_type: AccountType::RegularDonor,
        address: None,
        location: None,
    }
}

#[tokio::test]
async fn test_donor_list_skips_unreadable_profiles() {
    let cipher = fresh_cipher();
    let stranger = fresh_cipher();

    let mut documents = Vec::new();
    for (nombre, email) in [
        ("María López", "maria@example.com"),
        ("Jorge Ruiz", "jorge@example.com"),
    ] {
        let encrypted = encrypt_profile(&cipher, &donor(nombre, email))
            .await
            .expect("encrypt");
        // Profiles travel through the document store as JSON.
        documents.push(serde_json::to_string(&encrypted).expect("document"));
    }
    let foreign = encrypt_profile(&stranger, &donor("Otra Persona", "otra@example.com"))
        .await
        .expect("encrypt");
    documents.push(serde_json::to_string(&foreign).expect("document"));

    let mut listed = Vec::new();
    for document in &documents {
        let encrypted: EncryptedProfile = serde_json::from_str(document).expect("parse");
        let profile = decrypt_profile(&cipher, &encrypted).await;
        if profile.is_listable() {
            listed.push(profile.nombre.expect("nombre"));
        }
    }

    assert_eq!(listed, vec!["María López", "Jorge Ruiz"]);
}

#[tokio::test]
async fn test_account_type_is_stored_in_clear() {
    let cipher = fresh_cipher();
    let mut staff = donor("Ana Torres", "ana@bamx.org.mx");
    staff.account_type = AccountType::FoodBankStaff;

    let encrypted = encrypt_profile(&cipher, &staff).await.expect("encrypt");
    let document = serde_json::to_string(&encrypted).expect("document");

    assert!(document.contains(r#""accountType":"food bank staff""#));
    assert!(!document.contains("Ana Torres"));
    assert!(!document.contains("ana@bamx.org.mx"));
}

#[tokio::test]
async fn test_pickup_locations_survive_unchanged() {
    let cipher = fresh_cipher();
    let mut rng = StdRng::seed_from_u64(0x9a7d);

    for _ in 0..1_000 {
        let location = Location {
            latitude: rng.gen_range(-90.0..=90.0),
            longitude: rng.gen_range(-180.0..=180.0),
        };
        let envelope = encrypt_location(&cipher, &location).await.expect("encrypt");
        let decrypted = decrypt_location(&cipher, &envelope).await.expect("decrypt");
        assert_eq!(decrypted.latitude.to_bits(), location.latitude.to_bits());
        assert_eq!(decrypted.longitude.to_bits(), location.longitude.to_bits());
    }
}
