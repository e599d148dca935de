//! Error types shared by the installer and the launcher.

use thiserror::Error;

/// Errors raised while loading or validating the launcher artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The bytes do not contain the identifying marker.
    #[error("launcher artifact does not carry the venv-bootstrap marker")]
    MissingMarker,

    /// The marker is present but the version line is missing or ambiguous.
    #[error("launcher artifact does not declare exactly one version")]
    VersionUnknown,

    /// The artifact declares a different version than this build.
    #[error("launcher artifact version {found} does not match installer version {expected}")]
    VersionMismatch {
        /// Version this build expects.
        expected: String,
        /// Version the artifact declares.
        found: String,
    },

    /// Reading the artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`ArtifactError`].
pub type Result<T> = std::result::Result<T, ArtifactError>;
