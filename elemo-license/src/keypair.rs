//! Ed25519 key material for license signing and verification.
//!
//! Both halves of a key pair have a canonical text form: RFC 4648 base32,
//! uppercase, no padding. The private key text encodes the 32-byte seed and
//! the public key text encodes the 32-byte compressed point.

use crate::error::{LicenseError, LicenseResult};
use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{
    Signature, Signer as _, SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use std::fmt;
use std::str::FromStr;

/// Ed25519 signing key. Held only by the operator running the issuer.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

/// Ed25519 verifying key. Compiled into the server.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PrivateKey {
    /// Generates a fresh key from the operating system's CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Creates a private key from a raw 32-byte seed.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self(SigningKey::from_bytes(bytes))
    }

    /// Returns the raw 32-byte seed.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Parses the canonical base32 text form.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedKey`] if the text is not valid base32
    /// or does not decode to exactly 32 bytes.
    pub fn from_text(text: &str) -> LicenseResult<Self> {
        let bytes: [u8; SECRET_KEY_LENGTH] = decode_key(text, "private")?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Returns the canonical base32 text form.
    #[must_use]
    pub fn to_text(&self) -> String {
        BASE32_NOPAD.encode(&self.0.to_bytes())
    }

    /// Derives the matching public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    pub(crate) fn sign(&self, message: &[u8]) -> Signature {
        self.0.sign(message)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&"[REDACTED]").finish()
    }
}

impl FromStr for PrivateKey {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl PublicKey {
    /// Creates a public key from a raw 32-byte compressed point.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedKey`] if the bytes are not a valid
    /// curve point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> LicenseResult<Self> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| LicenseError::MalformedKey("public key is not a valid curve point".into()))
    }

    /// Returns the raw 32-byte compressed point.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Parses the canonical base32 text form.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedKey`] on bad base32, wrong length, or
    /// an invalid curve point.
    pub fn from_text(text: &str) -> LicenseResult<Self> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = decode_key(text, "public")?;
        Self::from_bytes(&bytes)
    }

    /// Returns the canonical base32 text form.
    #[must_use]
    pub fn to_text(&self) -> String {
        BASE32_NOPAD.encode(self.0.as_bytes())
    }

    pub(crate) fn verify(&self, message: &[u8], signature: &Signature) -> LicenseResult<()> {
        self.0
            .verify_strict(message, signature)
            .map_err(|_| LicenseError::BadSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_text()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for PublicKey {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

/// Decodes base32 key text into a fixed-size array. Surrounding whitespace
/// (a trailing newline in a key file) is tolerated.
fn decode_key<const N: usize>(text: &str, kind: &str) -> LicenseResult<[u8; N]> {
    let decoded = BASE32_NOPAD
        .decode(text.trim().as_bytes())
        .map_err(|e| LicenseError::MalformedKey(format!("invalid {kind} key base32: {e}")))?;

    let len = decoded.len();
    decoded.try_into().map_err(|_| {
        LicenseError::MalformedKey(format!("{kind} key must be {N} bytes, got {len}"))
    })
}
