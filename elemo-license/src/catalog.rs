//! Feature and quota catalogue.
//!
//! Tags outside the catalogue are carried as [`Feature::Other`] so a license
//! issued for a newer release still loads on an older binary. Such tags
//! round-trip unchanged but never unlock a known feature.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// An optional capability a license can unlock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Project components.
    Components,
    /// User-defined issue statuses.
    CustomStatuses,
    /// User-defined issue fields.
    CustomFields,
    /// More than one assignee per issue.
    MultipleAssignees,
    /// Release planning.
    Releases,
    /// A tag this binary does not know about.
    Other(String),
}

impl Feature {
    /// Returns the wire tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Components => "components",
            Self::CustomStatuses => "custom_statuses",
            Self::CustomFields => "custom_fields",
            Self::MultipleAssignees => "multiple_assignees",
            Self::Releases => "releases",
            Self::Other(tag) => tag.as_str(),
        }
    }

    /// Returns true if the tag is part of this binary's catalogue.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for Feature {
    fn from(tag: &str) -> Self {
        match tag {
            "components" => Self::Components,
            "custom_statuses" => Self::CustomStatuses,
            "custom_fields" => Self::CustomFields,
            "multiple_assignees" => Self::MultipleAssignees,
            "releases" => Self::Releases,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from(tag.as_str()))
    }
}

/// A named numeric ceiling enforced against observed usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quota {
    /// Active user accounts.
    Seats,
    /// Organizations.
    Organizations,
    /// Namespaces.
    Namespaces,
    /// Projects.
    Projects,
    /// Custom roles.
    Roles,
    /// Documents.
    Documents,
}

impl Quota {
    /// Every quota in the catalogue.
    pub const ALL: [Self; 6] = [
        Self::Seats,
        Self::Organizations,
        Self::Namespaces,
        Self::Projects,
        Self::Roles,
        Self::Documents,
    ];

    /// Returns the wire key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seats => "seats",
            Self::Organizations => "organizations",
            Self::Namespaces => "namespaces",
            Self::Projects => "projects",
            Self::Roles => "roles",
            Self::Documents => "documents",
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features granted when the issuer is not given an explicit list.
pub const DEFAULT_FEATURES: &[Feature] = &[
    Feature::Components,
    Feature::CustomStatuses,
    Feature::CustomFields,
    Feature::MultipleAssignees,
    Feature::Releases,
];

/// Quota ceilings granted when the issuer is not given an override.
pub const DEFAULT_QUOTAS: &[(Quota, u32)] = &[
    (Quota::Seats, 5),
    (Quota::Organizations, 1),
    (Quota::Namespaces, 10),
    (Quota::Projects, 10),
    (Quota::Roles, 10),
    (Quota::Documents, 100),
];

/// Returns [`DEFAULT_QUOTAS`] as a wire-keyed map.
#[must_use]
pub fn default_quotas() -> BTreeMap<String, u32> {
    DEFAULT_QUOTAS
        .iter()
        .map(|(quota, limit)| (quota.as_str().to_string(), *limit))
        .collect()
}
