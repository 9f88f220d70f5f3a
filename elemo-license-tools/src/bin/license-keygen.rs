//! Generates the Ed25519 key pair used to sign licenses.
//!
//! The public key file is what gets compiled into the server.

use anyhow::Result;
use elemo_license_tools::{init_tracing, keygen, parse_args};

fn main() -> Result<()> {
    let args: keygen::KeygenArgs = parse_args();
    init_tracing(args.verbose);

    let public_key = keygen::keygen(&args)?;
    eprintln!("public key: {public_key}");
    Ok(())
}
