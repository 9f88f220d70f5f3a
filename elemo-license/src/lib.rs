//! Offline, signed licenses for Elemo.
//!
//! This crate handles:
//! - Ed25519 key pairs with a base32 text form
//! - The signed envelope that carries a license payload
//! - The license model: canonical encoding, validation and entitlement queries
//! - The process-wide license the server installs at startup
//!
//! # License File Format
//!
//! A license file holds one base32 string (RFC 4648, uppercase, no padding)
//! encoding `u32-LE len(payload) ‖ payload ‖ signature`. The payload is
//! compact JSON with a fixed key order; see [`License`].
//!
//! # Loading
//!
//! [`License::load`] verifies the signature before parsing the payload, checks
//! structural invariants before expiry, and fails with the first
//! [`LicenseError`] it meets. Once loaded, entitlement checks such as
//! [`License::has_feature`] and [`License::within_threshold`] are infallible.

mod catalog;
mod config;
mod error;
mod id;
mod keypair;
mod license;
mod slot;

pub mod envelope;

pub use catalog::{default_quotas, Feature, Quota, DEFAULT_FEATURES, DEFAULT_QUOTAS};
pub use config::{LicenseConfig, DEFAULT_LICENSE_FILE};
pub use error::{LicenseError, LicenseResult};
pub use id::{LicenseId, ParseLicenseIdError, ID_SIZE, ID_TEXT_LEN};
pub use keypair::{PrivateKey, PublicKey};
pub use license::{License, LicenseRequest, LicenseStatus, REQUIRED_QUOTA};
pub use slot::{
    current_license, global_slot, install, load_embedded, load_file, reload, try_current_license,
    LicenseSlot, EMBEDDED_PUBLIC_KEY,
};
