//! License serial numbers.
//!
//! A [`LicenseId`] is a 96-bit identifier laid out as
//! `unix seconds (4, BE) ‖ machine id (3) ‖ process id (2, BE) ‖ counter (3, BE)`
//! and rendered as 20 characters of lowercase base32hex without padding.
//! Because the timestamp leads and base32hex preserves byte order, sorting the
//! text sorts licenses by issue time.

use data_encoding::BASE32HEX_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Raw size of a license id in bytes.
pub const ID_SIZE: usize = 12;

/// Length of the text form.
pub const ID_TEXT_LEN: usize = 20;

static MACHINE_ID: LazyLock<[u8; 3]> = LazyLock::new(machine_id);

static COUNTER: LazyLock<AtomicU32> = LazyLock::new(|| AtomicU32::new(rand::random()));

/// Error returned when license id text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid license id {0:?}")]
pub struct ParseLicenseIdError(String);

/// Globally unique, time-sortable license serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LicenseId([u8; ID_SIZE]);

impl LicenseId {
    /// Creates a new id stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        let secs = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(u32::MAX);
        let pid = (std::process::id() & 0xFFFF) as u16;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; ID_SIZE];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..7].copy_from_slice(&*MACHINE_ID);
        bytes[7..9].copy_from_slice(&pid.to_be_bytes());
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Creates an id from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Returns the creation time embedded in the id.
    #[must_use]
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        chrono::DateTime::from_timestamp(i64::from(secs), 0)
    }

    /// Parses an id from its text form.
    ///
    /// # Errors
    ///
    /// Returns an error unless `s` is exactly 20 lowercase base32hex characters.
    pub fn parse(s: &str) -> Result<Self, ParseLicenseIdError> {
        let invalid = || ParseLicenseIdError(s.to_string());

        if s.len() != ID_TEXT_LEN || s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(invalid());
        }

        let decoded = BASE32HEX_NOPAD
            .decode(s.to_ascii_uppercase().as_bytes())
            .map_err(|_| invalid())?;
        let bytes: [u8; ID_SIZE] = decoded.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl Default for LicenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LicenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE32HEX_NOPAD.encode(&self.0).to_ascii_lowercase())
    }
}

impl FromStr for LicenseId {
    type Err = ParseLicenseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LicenseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LicenseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Derives a stable 3-byte machine id from the host name.
fn machine_id() -> [u8; 3] {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    let hash = Sha256::digest(host.as_bytes());
    [hash[0], hash[1], hash[2]]
}
