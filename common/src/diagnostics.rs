//! User-facing diagnostic lines.
//!
//! Diagnostics are plain informational lines, or lines prefixed with
//! `warning: ` or `error: `. Informational lines may be suppressed; warnings
//! and errors are always written.

use std::fmt;
use std::io::Write;

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Plain progress or status line.
    Info,
    /// Something unusual that did not stop the operation.
    Warning,
    /// The operation failed or was refused.
    Error,
}

impl Severity {
    /// Prefix written before the message.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Warning => "warning: ",
            Self::Error => "error: ",
        }
    }
}

/// Sink for diagnostics.
pub trait Reporter {
    /// Emits one diagnostic line.
    fn report(&mut self, severity: Severity, message: &str);

    /// Emits an informational line.
    fn info(&mut self, message: &str) {
        self.report(Severity::Info, message);
    }

    /// Emits a warning line.
    fn warning(&mut self, message: &str) {
        self.report(Severity::Warning, message);
    }

    /// Emits an error line.
    fn error(&mut self, message: &str) {
        self.report(Severity::Error, message);
    }
}

/// Writes diagnostics to a stream, optionally hiding informational lines.
///
/// # Examples
///
/// ```
/// use venv_bootstrap_common::diagnostics::{Reporter, StreamReporter};
///
/// let mut reporter = StreamReporter::new(Vec::new(), false);
/// reporter.info("hidden");
/// reporter.error("shown");
/// assert_eq!(reporter.into_inner(), b"error: shown\n");
/// ```
#[derive(Debug)]
pub struct StreamReporter<W> {
    stream: W,
    show_info: bool,
}

impl<W: Write> StreamReporter<W> {
    /// Creates a reporter writing to `stream`.
    #[must_use]
    pub const fn new(stream: W, show_info: bool) -> Self {
        Self { stream, show_info }
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: Write> Reporter for StreamReporter<W> {
    fn report(&mut self, severity: Severity, message: &str) {
        if severity == Severity::Info && !self.show_info {
            return;
        }
        write_line(&mut self.stream, format_args!("{}{message}", severity.prefix()));
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: Vec<(Severity, String)>,
}

impl RecordingReporter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded diagnostics in emission order.
    #[must_use]
    pub fn entries(&self) -> &[(Severity, String)] {
        &self.entries
    }

    /// Number of recorded diagnostics with `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|(recorded, _)| *recorded == severity)
            .count()
    }

    /// Messages recorded with `severity`.
    pub fn messages(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(recorded, _)| *recorded == severity)
            .map(|(_, message)| message.as_str())
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, severity: Severity, message: &str) {
        self.entries.push((severity, message.to_owned()));
    }
}

/// Writes `message` followed by a newline, ignoring write failures.
pub fn write_line(stream: &mut dyn Write, message: impl fmt::Display) {
    if writeln!(stream, "{message}").is_err() {
        // Best-effort output; a closed stderr must not turn into a failure.
    }
}
