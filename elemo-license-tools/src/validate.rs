//! `license-validate`: verify a license file against a public key file.

use crate::files;
use anyhow::{Context, Result};
use clap::Parser;
use elemo_license::License;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "license-validate")]
#[command(about = "Verify an Elemo license and print it as JSON")]
pub struct ValidateArgs {
    /// Path to the base32 public key
    #[arg(long)]
    pub public_key: PathBuf,

    /// Path to the license file
    #[arg(long)]
    pub license: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Loads and fully validates the license named by `args`.
pub fn validate(args: &ValidateArgs) -> Result<License> {
    let public_key = files::read_text_file(&args.public_key, "public key")?;
    let armored = files::read_text_file(&args.license, "license")?;

    License::load(&armored, &public_key).map_err(|e| {
        let phase = e.phase();
        anyhow::Error::new(e).context(format!(
            "license {} rejected during {phase}",
            args.license.display()
        ))
    })
}

/// Renders a validated license for stdout.
pub fn render(license: &License) -> Result<String> {
    license.to_pretty_json().context("failed to render license")
}
