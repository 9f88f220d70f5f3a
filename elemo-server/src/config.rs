//! Server configuration, read from a TOML file.
//!
//! ```toml
//! [http]
//! address = "127.0.0.1:35478"
//!
//! [license]
//! file = "/etc/elemo/license.key"
//!
//! [log]
//! level = "info"
//! ```
//!
//! Every key is optional.

use anyhow::{Context, Result};
use elemo_license::LicenseConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Default HTTP listen address.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:35478";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub http: HttpConfig,
    pub license: LicenseConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub address: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 35478)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid server configuration")
    }

    /// Reads the configuration file, or returns defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.http.address.to_string(), DEFAULT_ADDRESS);
        assert_eq!(config.license.file, PathBuf::from("license.key"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            [http]
            address = "0.0.0.0:8080"

            [license]
            file = "/etc/elemo/license.key"
            "#,
        )
        .unwrap();
        assert_eq!(config.http.address.port(), 8080);
        assert_eq!(config.license.file, PathBuf::from("/etc/elemo/license.key"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(ServerConfig::from_toml("[license]\npath = \"x\"").is_err());
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(ServerConfig::load(None).unwrap(), ServerConfig::default());
    }
}
