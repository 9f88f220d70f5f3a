//! `license-gen`: build, sign and write a license.

use crate::files;
use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use elemo_license::{
    default_quotas, Feature, License, LicenseRequest, PrivateKey, DEFAULT_FEATURES,
    DEFAULT_LICENSE_FILE,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default validity period in days.
pub const DEFAULT_VALIDITY_DAYS: u32 = 365;

#[derive(Parser, Debug, Clone)]
#[command(name = "license-gen")]
#[command(about = "Issue a signed Elemo license")]
pub struct IssueArgs {
    /// Billing or contact email of the licensee
    #[arg(long)]
    pub email: String,

    /// Licensee organization name
    #[arg(long)]
    pub organization: String,

    /// Days until the license expires
    #[arg(long, default_value_t = DEFAULT_VALIDITY_DAYS)]
    pub validity_period: u32,

    /// Comma-separated feature tags (defaults to every known feature)
    #[arg(long)]
    pub features: Option<String>,

    /// Comma-separated key=value quotas, merged over the defaults
    #[arg(long)]
    pub quota: Vec<String>,

    /// Path to the base32 private key
    #[arg(long)]
    pub private_key: PathBuf,

    /// Where to write the license
    #[arg(long, default_value = DEFAULT_LICENSE_FILE)]
    pub license: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Builds, seals and writes a license, returning it.
///
/// Inputs are validated before the private key is read, so a rejected
/// request never touches the destination file.
pub fn issue(args: &IssueArgs) -> Result<License> {
    if args.validity_period == 0 {
        bail!("validity period must be at least one day");
    }

    let features = match &args.features {
        Some(csv) => parse_features(csv),
        None => DEFAULT_FEATURES.to_vec(),
    };

    let mut quotas = default_quotas();
    for csv in &args.quota {
        quotas.extend(parse_quotas(csv)?);
    }

    let expires_at = Utc::now()
        .checked_add_signed(Duration::days(i64::from(args.validity_period)))
        .with_context(|| {
            format!("validity period of {} days is out of range", args.validity_period)
        })?;

    let license = License::build(LicenseRequest {
        id: None,
        email: args.email.clone(),
        organization: args.organization.clone(),
        features,
        quotas,
        expires_at,
    })?;

    let key_text = files::read_private_key_file(&args.private_key)?;
    let key = PrivateKey::from_text(&key_text)
        .with_context(|| format!("invalid private key {}", args.private_key.display()))?;

    let armored = license.seal(&key)?;
    files::write_secret_file(&args.license, &armored)?;

    tracing::info!(
        license_id = %license.id(),
        organization = license.organization(),
        path = %args.license.display(),
        "license issued"
    );
    Ok(license)
}

/// Parses a comma-separated feature list. Blank entries are skipped, so an
/// empty string grants no features.
pub fn parse_features(csv: &str) -> Vec<Feature> {
    csv.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(Feature::from)
        .collect()
}

/// Parses a comma-separated `key=value` quota list.
pub fn parse_quotas(csv: &str) -> Result<BTreeMap<String, u32>> {
    let mut quotas = BTreeMap::new();
    for entry in csv.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("quota {entry:?} must be key=value");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("quota {entry:?} has an empty key");
        }
        let value: u32 = value.trim().parse().with_context(|| {
            format!("quota {key:?} must be a non-negative 32-bit integer, got {value:?}")
        })?;
        quotas.insert(key.to_string(), value);
    }
    Ok(quotas)
}
