//! The license payload, its canonical encoding and the entitlement queries.
//!
//! The signed payload is compact JSON with keys in this fixed order:
//!
//! ```text
//! {"id":"…","email":"…","organization":"…","features":[…],"quotas":{…},"expires_at":"YYYY-MM-DDTHH:MM:SSZ"}
//! ```
//!
//! Quota keys are emitted in ascending order and `expires_at` never carries a
//! fractional part or a numeric offset, so two serializations of the same
//! license are byte-identical. Loading re-encodes the parsed payload and
//! rejects it unless the bytes match what was signed.

use crate::catalog::{Feature, Quota};
use crate::envelope;
use crate::error::{LicenseError, LicenseResult};
use crate::id::{ID_SIZE, LicenseId};
use crate::keypair::{PrivateKey, PublicKey};
use chrono::{DateTime, Datelike, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quota every license must carry.
pub const REQUIRED_QUOTA: Quota = Quota::Seats;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Latest year the four-digit `expires_at` rendering can carry.
const MAX_EXPIRY_YEAR: i32 = 9999;

/// Operator input for issuing a license.
#[derive(Debug, Clone)]
pub struct LicenseRequest {
    /// Serial to use; a fresh one is generated when absent.
    pub id: Option<LicenseId>,
    /// Billing or contact address.
    pub email: String,
    /// Licensee display name.
    pub organization: String,
    /// Granted features, duplicates allowed.
    pub features: Vec<Feature>,
    /// Quota ceilings keyed by wire name.
    pub quotas: BTreeMap<String, u32>,
    /// Expiry instant; truncated to whole seconds.
    pub expires_at: DateTime<Utc>,
}

/// Observable license state at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Structurally sound and not yet expired.
    Valid,
    /// Past `expires_at`; the service should treat itself as unlicensed.
    Expired,
}

/// A verified license. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    id: LicenseId,
    email: String,
    organization: String,
    features: Vec<Feature>,
    quotas: BTreeMap<String, u32>,
    #[serde(with = "canonical_time")]
    expires_at: DateTime<Utc>,
}

/// Wire shape of the payload. `id` stays textual so a bad serial is reported
/// as a structural fault rather than a parse failure.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Payload {
    id: String,
    email: String,
    organization: String,
    features: Vec<Feature>,
    quotas: BTreeMap<String, u32>,
    #[serde(with = "canonical_time")]
    expires_at: DateTime<Utc>,
}

impl License {
    /// Assembles a license from operator input.
    ///
    /// Generates an id if none was given, trims `email` and `organization`,
    /// truncates `expires_at` to seconds and collapses duplicate features,
    /// keeping the first occurrence. Expiry against the clock is not checked
    /// here, but `expires_at` must fall within years 0000 to 9999.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidLicense`] listing every offending field.
    pub fn build(request: LicenseRequest) -> LicenseResult<Self> {
        let license = Self {
            id: request.id.unwrap_or_default(),
            email: request.email.trim().to_string(),
            organization: request.organization.trim().to_string(),
            features: dedup(request.features),
            quotas: request.quotas,
            expires_at: request.expires_at.trunc_subsecs(0),
        };

        let fields = license.violations();
        if !fields.is_empty() {
            return Err(LicenseError::InvalidLicense { fields });
        }
        Ok(license)
    }

    /// Serializes the license and signs it, returning the armored envelope.
    ///
    /// # Errors
    ///
    /// Propagates serialization and envelope errors.
    pub fn seal(&self, key: &PrivateKey) -> LicenseResult<String> {
        let payload = self.canonical_json()?;
        envelope::sign(&payload, key)
    }

    /// Returns the exact bytes that are signed.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedPayload`] if serialization fails.
    pub fn canonical_json(&self) -> LicenseResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LicenseError::MalformedPayload(e.to_string()))
    }

    /// Renders the license as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedPayload`] if serialization fails.
    pub fn to_pretty_json(&self) -> LicenseResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LicenseError::MalformedPayload(e.to_string()))
    }

    /// Loads a license, verifying it against a base32 public key.
    ///
    /// # Errors
    ///
    /// See [`License::load_at`]; additionally returns
    /// [`LicenseError::MalformedKey`] if the key text is invalid.
    pub fn load(armored: &str, public_key_text: &str) -> LicenseResult<Self> {
        let key = PublicKey::from_text(public_key_text)?;
        Self::load_with_key(armored, &key)
    }

    /// Loads a license against a parsed public key at the current time.
    ///
    /// # Errors
    ///
    /// See [`License::load_at`].
    pub fn load_with_key(armored: &str, key: &PublicKey) -> LicenseResult<Self> {
        Self::load_at(armored, key, Utc::now())
    }

    /// Loads a license and checks it is still valid at `now`.
    ///
    /// The signature is verified before the payload is parsed, and structural
    /// checks run before the expiry check.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::MalformedEnvelope`] or [`LicenseError::BadSignature`]
    ///   from the envelope layer.
    /// - [`LicenseError::MalformedPayload`] if the JSON is not canonical.
    /// - [`LicenseError::InvalidLicense`] if a structural invariant fails.
    /// - [`LicenseError::Expired`] if `expires_at <= now`.
    pub fn load_at(armored: &str, key: &PublicKey, now: DateTime<Utc>) -> LicenseResult<Self> {
        let license = Self::open(armored, key)?;

        if license.expires_at <= now {
            tracing::warn!(
                license_id = %license.id,
                expires_at = %license.expires_at_text(),
                "license has expired"
            );
            return Err(LicenseError::Expired(license.expires_at_text()));
        }

        tracing::debug!(
            license_id = %license.id,
            organization = %license.organization,
            "license loaded"
        );
        Ok(license)
    }

    /// Verifies and parses a license without checking expiry.
    ///
    /// # Errors
    ///
    /// Same as [`License::load_at`] except it never returns
    /// [`LicenseError::Expired`].
    pub fn open(armored: &str, key: &PublicKey) -> LicenseResult<Self> {
        let payload = envelope::verify(armored, key)?;
        Self::from_payload(&payload)
    }

    /// Parses and structurally validates signed payload bytes.
    fn from_payload(bytes: &[u8]) -> LicenseResult<Self> {
        let payload: Payload = serde_json::from_slice(bytes)
            .map_err(|e| LicenseError::MalformedPayload(e.to_string()))?;

        // Key order, whitespace, quota order and escapes must all match the
        // encoder exactly.
        let canonical = serde_json::to_vec(&payload)
            .map_err(|e| LicenseError::MalformedPayload(e.to_string()))?;
        if canonical != bytes {
            return Err(LicenseError::MalformedPayload(
                "payload is not in canonical form".to_string(),
            ));
        }

        let id = LicenseId::parse(&payload.id).ok();
        let license = Self {
            id: id.unwrap_or(LicenseId::from_bytes([0; ID_SIZE])),
            email: payload.email,
            organization: payload.organization,
            features: dedup(payload.features),
            quotas: payload.quotas,
            expires_at: payload.expires_at,
        };

        let mut fields = Vec::new();
        if id.is_none() {
            fields.push("id".to_string());
        }
        fields.extend(license.violations());
        if !fields.is_empty() {
            tracing::warn!(fields = ?fields, "license failed structural validation");
            return Err(LicenseError::InvalidLicense { fields });
        }
        Ok(license)
    }

    /// Lists the fields that break a structural invariant.
    fn violations(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if !is_plausible_email(&self.email) {
            fields.push("email".to_string());
        }
        if self.organization.trim().is_empty() {
            fields.push("organization".to_string());
        }
        if self.features.iter().any(|f| f.as_str().is_empty()) {
            fields.push("features".to_string());
        }
        if !self.quotas.contains_key(REQUIRED_QUOTA.as_str()) {
            fields.push(format!("quotas.{REQUIRED_QUOTA}"));
        }
        if !(0..=MAX_EXPIRY_YEAR).contains(&self.expires_at.year()) {
            fields.push("expires_at".to_string());
        }
        fields
    }

    /// Returns the license serial.
    #[must_use]
    pub fn id(&self) -> LicenseId {
        self.id
    }

    /// Returns the billing or contact address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the licensee name.
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Returns the granted features in issue order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Returns all quota ceilings.
    #[must_use]
    pub fn quotas(&self) -> &BTreeMap<String, u32> {
        &self.quotas
    }

    /// Returns the ceiling for a quota key, if present.
    #[must_use]
    pub fn quota(&self, key: &str) -> Option<u32> {
        self.quotas.get(key).copied()
    }

    /// Returns the expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `expires_at` exactly as it appears in the signed payload.
    #[must_use]
    pub fn expires_at_text(&self) -> String {
        canonical_time::format(&self.expires_at)
    }

    /// Returns true if `tag` is among the granted features.
    #[must_use]
    pub fn has_feature(&self, tag: &str) -> bool {
        self.features.iter().any(|f| f.as_str() == tag)
    }

    /// Returns true if `feature` is granted. Unknown tags never match a
    /// catalogue feature.
    #[must_use]
    pub fn has(&self, feature: &Feature) -> bool {
        self.features.contains(feature)
    }

    /// Returns true if `observed` does not exceed the ceiling for `quota_key`.
    /// A missing quota blocks the operation.
    #[must_use]
    pub fn within_threshold(&self, quota_key: &str, observed: i64) -> bool {
        self.quotas
            .get(quota_key)
            .is_some_and(|&limit| observed <= i64::from(limit))
    }

    /// Typed form of [`License::within_threshold`].
    #[must_use]
    pub fn within_quota(&self, quota: Quota, observed: i64) -> bool {
        self.within_threshold(quota.as_str(), observed)
    }

    /// Returns true if the structural invariants hold and `now` is before
    /// expiry.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.violations().is_empty() && now < self.expires_at
    }

    /// Returns the license state at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> LicenseStatus {
        if self.is_valid(now) {
            LicenseStatus::Valid
        } else {
            LicenseStatus::Expired
        }
    }

    /// Returns whole days left until expiry; negative once expired.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().div_euclid(SECS_PER_DAY)
    }
}

/// Removes duplicate features, keeping the first occurrence.
fn dedup(features: Vec<Feature>) -> Vec<Feature> {
    let mut unique: Vec<Feature> = Vec::with_capacity(features.len());
    for feature in features {
        if !unique.contains(&feature) {
            unique.push(feature);
        }
    }
    unique
}

/// Checks for a single `@` between a non-empty local part and domain, with no
/// whitespace anywhere.
fn is_plausible_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Pinned `YYYY-MM-DDTHH:MM:SSZ` rendering of `expires_at`.
mod canonical_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&dt.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let dt = NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| serde::de::Error::custom(format!("expires_at {s:?}: {e}")))?;
        // chrono accepts unpadded fields; only the zero-padded rendering is canonical.
        if format(&dt) != s {
            return Err(serde::de::Error::custom(format!(
                "expires_at {s:?} is not in YYYY-MM-DDTHH:MM:SSZ form"
            )));
        }
        Ok(dt)
    }
}
