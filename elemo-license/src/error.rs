//! Error types for the licensing module.

use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Key text is not valid base32 or has the wrong length.
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// Armored envelope is not valid base32 or its framing is inconsistent.
    #[error("malformed license envelope: {0}")]
    MalformedEnvelope(String),

    /// Ed25519 signature does not verify under the supplied public key.
    #[error("license signature invalid")]
    BadSignature,

    /// Payload is not canonical JSON or has unknown, missing or mistyped keys.
    #[error("malformed license payload: {0}")]
    MalformedPayload(String),

    /// One or more structural invariants are violated.
    #[error("invalid license: {}", fields.join(", "))]
    InvalidLicense {
        /// Offending fields, e.g. `organization` or `quotas.seats`.
        fields: Vec<String>,
    },

    /// License has expired.
    #[error("license expired on {0}")]
    Expired(String),

    /// Reading or writing a key or license file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LicenseError {
    /// Names the load phase that produced this error.
    #[must_use]
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Io(_) => "load",
            Self::MalformedKey(_) | Self::MalformedEnvelope(_) | Self::BadSignature => "verify",
            Self::MalformedPayload(_) => "parse",
            Self::InvalidLicense { .. } => "validate",
            Self::Expired(_) => "expiry",
        }
    }

    /// Returns the offending fields for [`LicenseError::InvalidLicense`].
    #[must_use]
    pub fn invalid_fields(&self) -> &[String] {
        match self {
            Self::InvalidLicense { fields } => fields,
            _ => &[],
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
