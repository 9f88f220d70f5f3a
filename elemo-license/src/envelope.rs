//! Signed envelope encoding.
//!
//! The armored form is the RFC 4648 base32 (uppercase, no padding) encoding
//! of the following byte layout:
//!
//! ```text
//! len(payload): u32 little-endian ‖ payload ‖ Ed25519 signature (64 bytes)
//! ```
//!
//! The signature covers the payload bytes only. The layout carries no version
//! byte; issuer and loader ship separately and must agree on it forever.

use crate::error::{LicenseError, LicenseResult};
use crate::keypair::{PrivateKey, PublicKey};
use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{Signature, SIGNATURE_LENGTH};

/// Width of the little-endian payload length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Signs `payload` and returns the armored envelope.
///
/// # Errors
///
/// Returns [`LicenseError::MalformedEnvelope`] if the payload does not fit the
/// 32-bit length prefix.
pub fn sign(payload: &[u8], key: &PrivateKey) -> LicenseResult<String> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        LicenseError::MalformedEnvelope(format!("payload of {} bytes exceeds u32::MAX", payload.len()))
    })?;
    let signature = key.sign(payload);

    let mut envelope = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len() + SIGNATURE_LENGTH);
    envelope.extend_from_slice(&len.to_le_bytes());
    envelope.extend_from_slice(payload);
    envelope.extend_from_slice(&signature.to_bytes());

    tracing::debug!(payload_len = payload.len(), "sealed license envelope");
    Ok(BASE32_NOPAD.encode(&envelope))
}

/// Decodes an armored envelope, verifies its signature and returns the payload.
///
/// # Errors
///
/// - [`LicenseError::MalformedEnvelope`] if the text is not valid base32 or the
///   length prefix does not match the decoded size.
/// - [`LicenseError::BadSignature`] if the signature does not verify.
pub fn verify(armored: &str, key: &PublicKey) -> LicenseResult<Vec<u8>> {
    let envelope = BASE32_NOPAD
        .decode(armored.trim().as_bytes())
        .map_err(|e| LicenseError::MalformedEnvelope(format!("invalid base32: {e}")))?;

    let (payload, signature) = split(&envelope)?;
    key.verify(payload, &signature)?;

    tracing::debug!(payload_len = payload.len(), "verified license envelope");
    Ok(payload.to_vec())
}

/// Splits a raw envelope into its payload and signature.
fn split(envelope: &[u8]) -> LicenseResult<(&[u8], Signature)> {
    let Some((prefix, rest)) = envelope.split_first_chunk::<LENGTH_PREFIX_SIZE>() else {
        return Err(LicenseError::MalformedEnvelope(format!(
            "envelope is {} bytes, shorter than its length prefix",
            envelope.len()
        )));
    };

    let payload_len = u32::from_le_bytes(*prefix) as usize;
    if rest.len() != payload_len.saturating_add(SIGNATURE_LENGTH) {
        return Err(LicenseError::MalformedEnvelope(format!(
            "length prefix declares {payload_len} payload bytes but {} bytes follow",
            rest.len()
        )));
    }

    let (payload, sig_bytes) = rest.split_at(payload_len);
    let sig_bytes: &[u8; SIGNATURE_LENGTH] = sig_bytes
        .try_into()
        .map_err(|_| LicenseError::MalformedEnvelope("invalid signature length".into()))?;

    Ok((payload, Signature::from_bytes(sig_bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_length_payload_signature() {
        let key = PrivateKey::generate();
        let armored = sign(b"hello", &key).unwrap();
        let raw = BASE32_NOPAD.decode(armored.as_bytes()).unwrap();

        assert_eq!(raw.len(), 4 + 5 + 64);
        assert_eq!(&raw[..4], &[5, 0, 0, 0]);
        assert_eq!(&raw[4..9], b"hello");
    }

    #[test]
    fn empty_payload_roundtrip() {
        let key = PrivateKey::generate();
        let armored = sign(b"", &key).unwrap();
        assert_eq!(verify(&armored, &key.public_key()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn truncated_envelope_rejected() {
        let key = PrivateKey::generate();
        let armored = BASE32_NOPAD.encode(&[1, 0]);
        assert!(matches!(
            verify(&armored, &key.public_key()),
            Err(LicenseError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn inconsistent_length_rejected() {
        let key = PrivateKey::generate();
        let mut raw = BASE32_NOPAD.decode(sign(b"payload", &key).unwrap().as_bytes()).unwrap();
        raw.push(0);
        let armored = BASE32_NOPAD.encode(&raw);
        assert!(matches!(
            verify(&armored, &key.public_key()),
            Err(LicenseError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn oversized_length_prefix_rejected() {
        let key = PrivateKey::generate();
        let mut raw = vec![0xFF, 0xFF, 0xFF, 0xFF];
        raw.extend_from_slice(&[0u8; 64]);
        let armored = BASE32_NOPAD.encode(&raw);
        assert!(matches!(
            verify(&armored, &key.public_key()),
            Err(LicenseError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn non_base32_rejected() {
        let key = PrivateKey::generate();
        assert!(matches!(
            verify("not base32!", &key.public_key()),
            Err(LicenseError::MalformedEnvelope(_))
        ));
    }
}
