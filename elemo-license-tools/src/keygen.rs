//! `license-keygen`: create a signing key pair.

use crate::files;
use anyhow::{bail, Result};
use clap::Parser;
use elemo_license::{PrivateKey, PublicKey};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "license-keygen")]
#[command(about = "Generate an Ed25519 key pair for signing Elemo licenses")]
pub struct KeygenArgs {
    /// Where to write the private key (mode 0600)
    #[arg(long, default_value = "license-signing.key")]
    pub private_key: PathBuf,

    /// Where to write the public key
    #[arg(long, default_value = "license.pub")]
    pub public_key: PathBuf,

    /// Overwrite an existing private key
    #[arg(long)]
    pub force: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Generates and writes a fresh key pair, returning the public half.
pub fn keygen(args: &KeygenArgs) -> Result<PublicKey> {
    if args.private_key.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to replace it",
            args.private_key.display()
        );
    }

    let private_key = PrivateKey::generate();
    let public_key = private_key.public_key();

    files::write_secret_file(&args.private_key, &private_key.to_text())?;
    files::write_public_file(&args.public_key, &public_key.to_text())?;

    tracing::info!(
        private_key = %args.private_key.display(),
        public_key = %args.public_key.display(),
        "generated license signing key pair"
    );
    Ok(public_key)
}
