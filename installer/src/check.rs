//! Classification of what currently occupies an install target.

use crate::target::InstallTarget;
use log::trace;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use venv_bootstrap_common::{Identity, VersionedArtifact, identify};

/// State of an install target relative to the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The directory does not exist or is not a directory.
    NoDir,
    /// The launcher path is itself a directory.
    ADir,
    /// Nothing exists at the launcher path.
    Absent,
    /// The launcher path is a symbolic link, broken or not.
    ALink,
    /// The launcher path is a file that cannot be read.
    ReadError,
    /// The file does not carry the marker.
    NotOurs,
    /// The file carries the marker but no single parseable version line.
    VersionUnknown,
    /// The installed launcher is newer than the artifact.
    VersionNewer {
        /// Version found on disk.
        installed: Version,
    },
    /// The installed launcher is older than the artifact.
    VersionOlder {
        /// Version found on disk.
        installed: Version,
    },
    /// The installed launcher is byte-identical to the artifact.
    VersionSame,
    /// Same version, different bytes.
    VersionSameModified,
}

impl CheckOutcome {
    /// Short kebab-case name shown to users.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NoDir => "no-dir",
            Self::ADir => "a-dir",
            Self::Absent => "absent",
            Self::ALink => "a-link",
            Self::ReadError => "read-error",
            Self::NotOurs => "not-our",
            Self::VersionUnknown => "version-unknown",
            Self::VersionNewer { .. } => "version-newer",
            Self::VersionOlder { .. } => "version-older",
            Self::VersionSame => "version-same",
            Self::VersionSameModified => "version-same-modified",
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl InstallTarget {
    /// Classifies the current state of this target against `artifact`.
    ///
    /// Checks run in a fixed order and the first match wins. Nothing is
    /// written.
    #[must_use]
    pub fn check(&self, artifact: &VersionedArtifact) -> CheckOutcome {
        let outcome = self.inspect(artifact);
        trace!("{}: classified as {outcome}", self.path());
        outcome
    }

    fn inspect(&self, artifact: &VersionedArtifact) -> CheckOutcome {
        if !self.directory().is_dir() {
            return CheckOutcome::NoDir;
        }
        if self.path().is_dir() {
            return CheckOutcome::ADir;
        }
        let Ok(metadata) = fs::symlink_metadata(self.path()) else {
            return CheckOutcome::Absent;
        };
        if metadata.file_type().is_symlink() {
            return CheckOutcome::ALink;
        }
        let Ok(contents) = fs::read(self.path()) else {
            return CheckOutcome::ReadError;
        };
        classify(&contents, artifact)
    }
}

/// Classifies launcher `contents` against `artifact`.
///
/// # Examples
///
/// ```
/// use venv_bootstrap_common::VersionedArtifact;
/// use venv_bootstrap_installer::check::{CheckOutcome, classify};
///
/// let artifact = VersionedArtifact::from_template(
///     b"@@MARKER@@\nVERSION = \"@@VERSION@@\"\n",
///     "1.0.0",
/// )?;
/// assert_eq!(classify(artifact.bytes(), &artifact), CheckOutcome::VersionSame);
/// assert_eq!(classify(b"echo hi\n", &artifact), CheckOutcome::NotOurs);
/// # Ok::<(), venv_bootstrap_common::ArtifactError>(())
/// ```
#[must_use]
pub fn classify(contents: &[u8], artifact: &VersionedArtifact) -> CheckOutcome {
    match identify(contents) {
        Identity::Foreign => CheckOutcome::NotOurs,
        Identity::Unversioned => CheckOutcome::VersionUnknown,
        Identity::Versioned(installed) => match installed.cmp(artifact.version()) {
            Ordering::Greater => CheckOutcome::VersionNewer { installed },
            Ordering::Less => CheckOutcome::VersionOlder { installed },
            Ordering::Equal if contents == artifact.bytes() => CheckOutcome::VersionSame,
            Ordering::Equal => CheckOutcome::VersionSameModified,
        },
    }
}
