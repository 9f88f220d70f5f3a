//! Verifies an Elemo license and prints it as indented JSON.
//!
//! Usage:
//!   license-validate --public-key license.pub --license license.key

use anyhow::Result;
use elemo_license_tools::{init_tracing, parse_args, validate};

fn main() -> Result<()> {
    let args: validate::ValidateArgs = parse_args();
    init_tracing(args.verbose);

    let license = validate::validate(&args)?;
    println!("{}", validate::render(&license)?);
    Ok(())
}
