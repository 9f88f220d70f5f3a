mod common;

use common::{other_keypair, test_keypair};
use elemo_license::{LicenseError, PrivateKey, PublicKey, EMBEDDED_PUBLIC_KEY};

#[test]
fn generated_keys_are_fresh() {
    let a = PrivateKey::generate();
    let b = PrivateKey::generate();
    assert_ne!(a.to_bytes(), b.to_bytes());
    assert_ne!(a.public_key(), b.public_key());
}

#[test]
fn public_key_is_derived_deterministically() {
    assert_eq!(test_keypair().public_key(), test_keypair().public_key());
    assert_ne!(test_keypair().public_key(), other_keypair().public_key());
}

#[test]
fn public_text_roundtrip() {
    let pk = test_keypair().public_key();
    let parsed: PublicKey = pk.to_text().parse().unwrap();
    assert_eq!(parsed, pk);
    assert_eq!(pk.to_string(), pk.to_text());
}

#[test]
fn private_text_roundtrip_via_from_str() {
    let sk = test_keypair();
    let parsed: PrivateKey = sk.to_text().parse().unwrap();
    assert_eq!(parsed.to_bytes(), sk.to_bytes());
}

#[test]
fn public_key_bytes_roundtrip() {
    let pk = test_keypair().public_key();
    assert_eq!(PublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
}

#[test]
fn padded_text_rejected() {
    let text = format!("{}====", test_keypair().public_key().to_text());
    assert!(matches!(
        PublicKey::from_text(&text),
        Err(LicenseError::MalformedKey(_))
    ));
}

#[test]
fn empty_text_rejected() {
    assert!(matches!(
        PrivateKey::from_text(""),
        Err(LicenseError::MalformedKey(_))
    ));
}

#[test]
fn private_key_text_is_not_a_public_key_of_itself() {
    let sk = test_keypair();
    assert_ne!(sk.to_text(), sk.public_key().to_text());
}

#[test]
fn embedded_public_key_parses() {
    let pk = PublicKey::from_text(EMBEDDED_PUBLIC_KEY).unwrap();
    assert_eq!(pk.to_text(), EMBEDDED_PUBLIC_KEY.trim());
}
