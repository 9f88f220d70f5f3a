//! Process-wide license holder.
//!
//! The server loads its license once during startup and installs it here
//! before any request-serving component starts. Readers take lock-free
//! snapshots; a reload publishes the replacement with one atomic pointer swap,
//! so a reader sees either the old or the new license, never a mix.

use crate::error::LicenseResult;
use crate::keypair::PublicKey;
use crate::license::License;
use arc_swap::ArcSwap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Compiled-in public key the server verifies licenses against.
pub const EMBEDDED_PUBLIC_KEY: &str = include_str!("../keys/license.pub");

static GLOBAL: OnceLock<Arc<LicenseSlot>> = OnceLock::new();

/// A license shared between threads, replaceable as a whole.
#[derive(Debug)]
pub struct LicenseSlot {
    current: ArcSwap<License>,
}

impl LicenseSlot {
    /// Creates a slot holding `license`.
    #[must_use]
    pub fn new(license: License) -> Self {
        Self {
            current: ArcSwap::from_pointee(license),
        }
    }

    /// Returns a snapshot of the held license.
    #[must_use]
    pub fn current(&self) -> Arc<License> {
        self.current.load_full()
    }

    /// Publishes `license`, returning the one it replaced.
    pub fn replace(&self, license: License) -> Arc<License> {
        self.current.swap(Arc::new(license))
    }

    /// Loads `armored` and publishes it. On failure the held license is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Propagates any [`License::load_with_key`] error.
    pub fn reload(&self, armored: &str, key: &PublicKey) -> LicenseResult<Arc<License>> {
        let license = License::load_with_key(armored, key).inspect_err(|e| {
            tracing::warn!(error = %e, "license reload rejected, keeping current license");
        })?;

        tracing::info!(license_id = %license.id(), "license reloaded");
        let license = Arc::new(license);
        self.current.store(Arc::clone(&license));
        Ok(license)
    }
}

/// Reads and loads a license file against a base32 public key.
///
/// # Errors
///
/// Returns [`crate::LicenseError::Io`] if the file cannot be read, otherwise
/// any [`License::load`] error.
pub fn load_file(path: &Path, public_key_text: &str) -> LicenseResult<License> {
    let armored = fs::read_to_string(path)?;
    License::load(&armored, public_key_text)
}

/// Reads and loads a license file against [`EMBEDDED_PUBLIC_KEY`].
///
/// # Errors
///
/// See [`load_file`].
pub fn load_embedded(path: &Path) -> LicenseResult<License> {
    load_file(path, EMBEDDED_PUBLIC_KEY)
}

/// Installs the process-wide license. Only the first call succeeds; later
/// calls hand the rejected license back.
///
/// # Errors
///
/// Returns `license` unchanged if a license is already installed.
pub fn install(license: License) -> Result<(), License> {
    GLOBAL
        .set(Arc::new(LicenseSlot::new(license)))
        .map_err(|slot| (*slot.current()).clone())?;
    tracing::debug!("process license installed");
    Ok(())
}

/// Returns the process-wide license.
///
/// # Panics
///
/// Panics if called before [`install`].
#[must_use]
pub fn current_license() -> Arc<License> {
    match try_current_license() {
        Some(license) => license,
        None => panic!("current_license called before a license was installed"),
    }
}

/// Returns the process-wide license, or `None` before [`install`].
#[must_use]
pub fn try_current_license() -> Option<Arc<License>> {
    GLOBAL.get().map(|slot| slot.current())
}

/// Returns the process-wide slot, or `None` before [`install`].
#[must_use]
pub fn global_slot() -> Option<Arc<LicenseSlot>> {
    GLOBAL.get().cloned()
}

/// Reloads the process-wide license from `armored`.
///
/// # Errors
///
/// Propagates load errors; the installed license is kept on failure. If no
/// license was installed yet the loaded one is installed.
pub fn reload(armored: &str, public_key_text: &str) -> LicenseResult<Arc<License>> {
    let key = PublicKey::from_text(public_key_text)?;
    match GLOBAL.get() {
        Some(slot) => slot.reload(armored, &key),
        None => {
            let license = License::load_with_key(armored, &key)?;
            let slot = GLOBAL.get_or_init(|| Arc::new(LicenseSlot::new(license.clone())));
            slot.replace(license);
            Ok(slot.current())
        }
    }
}
