//! Issues a signed Elemo license.
//!
//! Usage:
//!   license-gen --email ops@example.com --organization "Example Inc" \
//!     --private-key license-signing.key --license license.key

use anyhow::Result;
use elemo_license_tools::{init_tracing, issue, parse_args};

fn main() -> Result<()> {
    let args: issue::IssueArgs = parse_args();
    init_tracing(args.verbose);

    let license = issue::issue(&args)?;
    eprintln!(
        "issued license {} for {} (expires {})",
        license.id(),
        license.organization(),
        license.expires_at().format("%Y-%m-%d")
    );
    Ok(())
}
