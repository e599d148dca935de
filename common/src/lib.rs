//! Shared pieces of venv-bootstrap: the launcher artifact's identity, the
//! diagnostics reporter used by both front-ends, and logging setup.

pub mod artifact;
pub mod diagnostics;
pub mod error;
pub mod logging;

pub use artifact::{
    Identity, MARKER, STAMP, VERSION, VersionedArtifact, identify, parse_version,
};
pub use diagnostics::{RecordingReporter, Reporter, Severity, StreamReporter, write_line};
pub use error::ArtifactError;
