//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use elemo_license::{
    default_quotas, envelope, License, LicenseRequest, PrivateKey, DEFAULT_FEATURES,
};
use std::collections::BTreeMap;

/// Returns a deterministic key pair from a fixed seed.
pub fn test_keypair() -> PrivateKey {
    let seed: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    PrivateKey::from_bytes(&seed)
}

/// Returns a second deterministic key pair, unrelated to [`test_keypair`].
pub fn other_keypair() -> PrivateKey {
    PrivateKey::from_bytes(&[42; 32])
}

/// Builds an issue request for Example Inc expiring `days` from now.
pub fn request_expiring_in(days: i64) -> LicenseRequest {
    LicenseRequest {
        id: None,
        email: "ops@example.com".to_string(),
        organization: "Example Inc".to_string(),
        features: DEFAULT_FEATURES.to_vec(),
        quotas: BTreeMap::from([("seats".to_string(), 5)]),
        expires_at: Utc::now() + Duration::days(days),
    }
}

/// Builds and seals a license with default features and quotas.
pub fn sealed_with_defaults(key: &PrivateKey, days: i64) -> String {
    let mut request = request_expiring_in(days);
    request.quotas = default_quotas();
    License::build(request).unwrap().seal(key).unwrap()
}

/// Signs a raw JSON payload, bypassing license construction checks.
pub fn sign_json(key: &PrivateKey, json: &str) -> String {
    envelope::sign(json.as_bytes(), key).unwrap()
}

/// A canonical payload expiring far in the future, with custom quotas JSON.
pub fn payload_with_quotas(quotas_json: &str) -> String {
    format!(
        r#"{{"id":"9m4e2mr0ui3e8a215n4g","email":"ops@example.com","organization":"Example Inc","features":["components"],"quotas":{quotas_json},"expires_at":"2099-01-01T00:00:00Z"}}"#
    )
}
