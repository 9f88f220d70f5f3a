//! Key and license file I/O.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Mode for files only the owner may read.
pub const SECRET_FILE_MODE: u32 = 0o600;

/// Mode for public key files.
pub const PUBLIC_FILE_MODE: u32 = 0o644;

/// Writes `contents` to `path` with owner-only permissions, replacing any
/// existing file.
pub fn write_secret_file(path: &Path, contents: &str) -> Result<()> {
    write_with_mode(path, contents, SECRET_FILE_MODE)
}

/// Writes `contents` to `path` readable by everyone.
pub fn write_public_file(path: &Path, contents: &str) -> Result<()> {
    write_with_mode(path, contents, PUBLIC_FILE_MODE)
}

fn write_with_mode(path: &Path, contents: &str, mode: u32) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    // `mode` only applies on creation; tighten a pre-existing file too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tracing::debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Reads a private key file, refusing one that group or others can access.
pub fn read_private_key_file(path: &Path) -> Result<String> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(path)
            .with_context(|| format!("failed to stat private key {}", path.display()))?
            .permissions()
            .mode();
        anyhow::ensure!(
            mode & 0o077 == 0,
            "private key {} has mode {:o}; restrict it with `chmod 600`",
            path.display(),
            mode & 0o777
        );
    }

    fs::read_to_string(path).with_context(|| format!("failed to read private key {}", path.display()))
}

/// Reads a public key or license file.
pub fn read_text_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {what} {}", path.display()))
}
