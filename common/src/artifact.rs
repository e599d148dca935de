//! Identity of the launcher artifact.
//!
//! The launcher executable carries a stamp: the [`MARKER`] followed by a single
//! `VERSION = "<version>"` line. Any file containing the marker is treated as
//! one of ours, and the stamp's version line is the only source of truth for
//! the version installed in a directory.

use crate::error::{ArtifactError, Result};
use log::trace;
use memchr::memmem;
use semver::Version;

macro_rules! marker {
    () => {
        "venv-bootstrap:6f1d2c4e-8b3a-4e59-a7c0-2d9e5b1f3a86"
    };
}

/// Byte sequence identifying files produced by this system.
pub const MARKER: &str = marker!();

/// Version of the artifact built from this workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stamp compiled into the launcher binary.
///
/// The leading and trailing newlines keep the version line anchored no matter
/// which bytes the linker places around the stamp.
pub static STAMP: &str = concat!(
    "\n",
    marker!(),
    "\nVERSION = \"",
    env!("CARGO_PKG_VERSION"),
    "\"\n"
);

/// Placeholder replaced by [`MARKER`] in artifact templates.
pub const MARKER_PLACEHOLDER: &str = "@@MARKER@@";

/// Placeholder replaced by the version in artifact templates.
pub const VERSION_PLACEHOLDER: &str = "@@VERSION@@";

/// What a blob says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// The marker is absent.
    Foreign,
    /// The marker is present but there is not exactly one parseable version
    /// line.
    Unversioned,
    /// The marker and a single version line are present.
    Versioned(Version),
}

/// Classifies `contents` by marker and embedded version line.
///
/// # Examples
///
/// ```
/// use venv_bootstrap_common::artifact::{identify, Identity, MARKER};
///
/// assert_eq!(identify(b"#!/bin/sh\n"), Identity::Foreign);
/// assert_eq!(identify(MARKER.as_bytes()), Identity::Unversioned);
///
/// let stamped = format!("{MARKER}\nVERSION = \"1.2.3\"\n");
/// assert!(matches!(identify(stamped.as_bytes()), Identity::Versioned(v) if v.minor == 2));
/// ```
#[must_use]
pub fn identify(contents: &[u8]) -> Identity {
    if memmem::find(contents, MARKER.as_bytes()).is_none() {
        return Identity::Foreign;
    }

    let mut lines = version_lines(contents);
    match (lines.next(), lines.next()) {
        (Some(value), None) => parse_version(&String::from_utf8_lossy(value))
            .map_or(Identity::Unversioned, Identity::Versioned),
        _ => Identity::Unversioned,
    }
}

/// Yields the quoted value of every line shaped like `VERSION = "<value>"`.
fn version_lines(contents: &[u8]) -> impl Iterator<Item = &[u8]> {
    contents.split(|byte| *byte == b'\n').filter_map(|line| {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        line.strip_prefix(b"VERSION = ")?
            .strip_prefix(b"\"")?
            .strip_suffix(b"\"")
    })
}

/// Parses a version string, accepting short numeric forms such as `0.1`.
///
/// Semantic versions parse as-is. A purely numeric version with one or two
/// components is padded with zeros, so `0.1` reads as `0.1.0`.
///
/// # Examples
///
/// ```
/// use venv_bootstrap_common::artifact::parse_version;
///
/// assert_eq!(parse_version("0.1").map(|v| v.to_string()), Some("0.1.0".to_owned()));
/// assert_eq!(parse_version("2.0.0-rc.1").map(|v| v.pre.to_string()), Some("rc.1".to_owned()));
/// assert!(parse_version("latest").is_none());
/// ```
#[must_use]
pub fn parse_version(text: &str) -> Option<Version> {
    if let Ok(version) = Version::parse(text) {
        return Some(version);
    }

    let components: Vec<&str> = text.split('.').collect();
    let numeric = components
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()));
    if !numeric || components.len() > 2 {
        return None;
    }

    let padded = components
        .into_iter()
        .chain(std::iter::repeat("0"))
        .take(3)
        .collect::<Vec<_>>()
        .join(".");
    Version::parse(&padded).ok()
}

/// The launcher bytes together with the version they declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedArtifact {
    bytes: Vec<u8>,
    version: Version,
}

impl VersionedArtifact {
    /// Wraps `bytes`, which must carry the marker and one version line.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::MissingMarker`] or
    /// [`ArtifactError::VersionUnknown`] when the bytes do not identify
    /// themselves.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        match identify(&bytes) {
            Identity::Versioned(version) => {
                trace!("artifact of {} bytes declares version {version}", bytes.len());
                Ok(Self { bytes, version })
            }
            Identity::Foreign => Err(ArtifactError::MissingMarker),
            Identity::Unversioned => Err(ArtifactError::VersionUnknown),
        }
    }

    /// Renders a template by substituting the marker and `version`.
    ///
    /// # Errors
    ///
    /// Returns an error when the rendered bytes do not identify themselves,
    /// for example because the template lacks a version line.
    ///
    /// # Examples
    ///
    /// ```
    /// use venv_bootstrap_common::artifact::VersionedArtifact;
    ///
    /// let artifact = VersionedArtifact::from_template(
    ///     b"# @@MARKER@@\nVERSION = \"@@VERSION@@\"\n",
    ///     "1.4.0",
    /// )?;
    /// assert_eq!(artifact.version().to_string(), "1.4.0");
    /// # Ok::<(), venv_bootstrap_common::error::ArtifactError>(())
    /// ```
    pub fn from_template(template: &[u8], version: &str) -> Result<Self> {
        let with_marker = replace_all(template, MARKER_PLACEHOLDER.as_bytes(), MARKER.as_bytes());
        let rendered = replace_all(&with_marker, VERSION_PLACEHOLDER.as_bytes(), version.as_bytes());
        Self::from_bytes(rendered)
    }

    /// Requires the declared version to equal `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::VersionMismatch`] when the versions differ or
    /// `expected` does not parse.
    pub fn require_version(self, expected: &str) -> Result<Self> {
        match parse_version(expected) {
            Some(version) if version == self.version => Ok(self),
            _ => Err(ArtifactError::VersionMismatch {
                expected: expected.to_owned(),
                found: self.version.to_string(),
            }),
        }
    }

    /// Returns the artifact bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the declared version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    let mut rendered = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(position) = memmem::find(rest, needle) {
        let (head, tail) = rest.split_at(position);
        rendered.extend_from_slice(head);
        rendered.extend_from_slice(replacement);
        rest = tail.get(needle.len()..).unwrap_or_default();
    }
    rendered.extend_from_slice(rest);
    rendered
}
