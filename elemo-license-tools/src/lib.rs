//! Offline license tooling for Elemo.
//!
//! Each binary is a thin wrapper around one module here:
//! - `license-keygen` → [`keygen`]
//! - `license-gen` → [`issue`]
//! - `license-validate` → [`validate`]
//!
//! Diagnostics go to stderr so `license-validate` can keep stdout for JSON.

pub mod files;
pub mod issue;
pub mod keygen;
pub mod validate;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

/// Parses command-line arguments, exiting with status 1 on a usage error.
/// `--help` and `--version` still exit 0.
pub fn parse_args<A: Parser>() -> A {
    match A::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.exit_code() == 0 { 0 } else { 1 };
            // Nothing more can be reported if stderr itself is gone.
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over
/// `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
