//! License enforcement at server startup.

use anyhow::{Context, Result};
use elemo_license::{install, global_slot, load_embedded, LicenseSlot, PublicKey, EMBEDDED_PUBLIC_KEY};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Loads the license file against the compiled-in key and installs it as the
/// process-wide license. Any failure is fatal: the server must not start
/// unlicensed.
pub fn install_license(path: &Path) -> Result<Arc<LicenseSlot>> {
    let license = load_embedded(path).map_err(|e| {
        error!(path = %path.display(), phase = e.phase(), error = %e, "license rejected");
        let phase = e.phase();
        anyhow::Error::new(e).context(format!(
            "refusing to start unlicensed: license {} failed during {phase}",
            path.display()
        ))
    })?;

    info!(
        license_id = %license.id(),
        organization = license.organization(),
        expires_at = %license.expires_at_text(),
        "license accepted"
    );

    if install(license).is_err() {
        warn!("a license was already installed; keeping it");
    }
    global_slot().context("license slot missing after install")
}

/// Re-reads the license file into `slot`. A rejected file leaves the current
/// license in place.
pub fn reload_license(slot: &LicenseSlot, path: &Path) -> Result<()> {
    let key = PublicKey::from_text(EMBEDDED_PUBLIC_KEY)?;
    let armored = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read license {}", path.display()))?;
    slot.reload(&armored, &key)?;
    Ok(())
}

/// Reloads the license whenever the process receives `SIGHUP`.
#[cfg(unix)]
pub async fn reload_on_hangup(slot: Arc<LicenseSlot>, path: std::path::PathBuf) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("cannot listen for SIGHUP, license reload disabled: {}", e);
            return;
        }
    };

    while hangups.recv().await.is_some() {
        info!("SIGHUP received, reloading license from {:?}", path);
        if let Err(e) = reload_license(&slot, &path) {
            warn!("license reload failed: {:#}", e);
        }
    }
}
