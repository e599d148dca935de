//! Install targets and the atomic write of the launcher.

use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs::File;
use std::io::Write;
use venv_bootstrap_common::VersionedArtifact;

/// File name of the installed launcher.
#[cfg(windows)]
pub const SCRIPT_NAME: &str = "venv-bootstrap.exe";

/// File name of the installed launcher.
#[cfg(not(windows))]
pub const SCRIPT_NAME: &str = "venv-bootstrap";

/// Prefix of the temporary file staged next to the target.
pub const TEMP_PREFIX: &str = ".venv-bootstrap.";

/// A directory that should contain the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    directory: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl InstallTarget {
    /// Creates a target for `directory`.
    ///
    /// # Examples
    ///
    /// ```
    /// use venv_bootstrap_installer::target::{InstallTarget, SCRIPT_NAME};
    ///
    /// let target = InstallTarget::new("/opt/tools");
    /// assert_eq!(target.path(), format!("/opt/tools/{SCRIPT_NAME}"));
    /// ```
    #[must_use]
    pub fn new(directory: impl Into<Utf8PathBuf>) -> Self {
        let directory = directory.into();
        let path = directory.join(SCRIPT_NAME);
        Self { directory, path }
    }

    /// The directory the launcher is installed into.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Full path of the installed launcher.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Writes `artifact` to the target path atomically.
    ///
    /// The bytes are staged in a temporary file inside the target directory,
    /// synced, marked executable and renamed over the target. The temporary
    /// file never outlives the call.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::WriteFailed`] when any step fails.
    pub fn install(&self, artifact: &VersionedArtifact) -> Result<()> {
        let write_failed = |source| InstallerError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.directory)
            .map_err(write_failed)?;
        debug!("staging {} via {}", self.path, staged.path().display());

        staged.write_all(artifact.bytes()).map_err(write_failed)?;
        staged.as_file().sync_all().map_err(write_failed)?;
        make_executable(staged.as_file()).map_err(write_failed)?;

        staged
            .persist(&self.path)
            .map_err(|err| write_failed(err.error))?;
        debug!("installed version {} at {}", artifact.version(), self.path);
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_file: &File) -> std::io::Result<()> {
    Ok(())
}
