//! Where the launcher artifact comes from.
//!
//! By default the installer ships with the launcher executable next to it;
//! that file is read once per process and validated against the installer's
//! own version.

use crate::error::{InstallerError, Result};
use crate::target::SCRIPT_NAME;
use log::debug;
use once_cell::sync::OnceCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use venv_bootstrap_common::{VERSION, VersionedArtifact};

static CURRENT: OnceCell<VersionedArtifact> = OnceCell::new();

/// The artifact shipped alongside this installer, loaded on first use.
///
/// # Errors
///
/// Returns an error when the sibling launcher is missing, is not an artifact,
/// or declares a version other than the installer's.
pub fn current_artifact() -> Result<&'static VersionedArtifact> {
    CURRENT.get_or_try_init(|| load_artifact(&sibling_launcher()?))
}

/// Path of the launcher executable next to the running installer.
///
/// # Errors
///
/// Returns an error when the current executable cannot be located.
pub fn sibling_launcher() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join(SCRIPT_NAME))
}

/// Reads the launcher at `path` and checks it matches [`VERSION`].
///
/// # Errors
///
/// Returns [`InstallerError::LauncherNotFound`] when `path` does not exist and
/// [`InstallerError::Artifact`] when its contents do not identify as this
/// version of the launcher.
pub fn load_artifact(path: &Path) -> Result<VersionedArtifact> {
    debug!("loading launcher artifact from {}", path.display());
    let bytes = fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => InstallerError::LauncherNotFound {
            path: path.to_path_buf(),
        },
        _ => InstallerError::Io(err),
    })?;
    let artifact = VersionedArtifact::from_bytes(bytes)?.require_version(VERSION)?;
    Ok(artifact)
}
