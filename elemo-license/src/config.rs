//! License configuration shared by the server and the tools.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default license file name, relative to the working directory.
pub const DEFAULT_LICENSE_FILE: &str = "license.key";

/// Where the server finds its signed license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LicenseConfig {
    /// Path to the armored license envelope.
    pub file: PathBuf,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LICENSE_FILE),
        }
    }
}
