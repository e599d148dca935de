//! Error types for the launcher installer.
//!
//! Refusals decided by the install policy are not errors; they are reported
//! through the diagnostics reporter. The variants here cover failures to load
//! the artifact or to write it.

use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;
use venv_bootstrap_common::ArtifactError;

/// Errors that can occur while installing the launcher.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The launcher executable to install could not be found.
    #[error("launcher executable not found at {}; pass --launcher PATH", path.display())]
    LauncherNotFound {
        /// Path where the launcher was expected.
        path: PathBuf,
    },

    /// The launcher bytes are not a valid artifact.
    #[error("invalid launcher artifact: {0}")]
    Artifact(#[from] ArtifactError),

    /// Writing the launcher into a target directory failed.
    #[error("failed to write {path}")]
    WriteFailed {
        /// Destination that could not be written.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
