//! Error types for the launcher.
//!
//! Every error ends the run with the configured fail code; the module's own
//! exit status never passes through here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning or running a module.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// No base Python interpreter could be located.
    #[error("no Python interpreter found on PATH (tried {tried})")]
    PythonNotFound {
        /// Interpreter names that were searched for.
        tried: String,
    },

    /// The base interpreter could not describe itself.
    #[error("failed to query {interpreter}: {reason}", interpreter = interpreter.display())]
    InterpreterProbe {
        /// Interpreter that was queried.
        interpreter: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The virtual environment could not be created.
    #[error("failed to provision environment at {path}: {reason}", path = path.display())]
    Provision {
        /// Environment root.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// The program and its arguments.
        program: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A helper command finished unsuccessfully.
    #[error("{command} failed with exit code {code}")]
    CommandFailed {
        /// The command that failed.
        command: String,
        /// Its exit code.
        code: i32,
    },

    /// The install specification cannot be split into arguments.
    #[error("cannot split install specification {spec:?}: unbalanced quotes")]
    InvalidInstallSpec {
        /// The offending specification.
        spec: String,
    },

    /// The module still cannot be imported after installing packages.
    #[error("{message}")]
    StillNotImportable {
        /// Import error reported by Python.
        message: String,
    },

    /// The child was started without a valid session.
    #[error("invalid launch session: {0}")]
    Session(#[from] serde_json::Error),

    /// The child was handed a session for a different role.
    #[error("launch session is not a child session")]
    NotAChildSession,

    /// The environment's executable directory cannot be put on `PATH`.
    #[error("cannot extend PATH: {0}")]
    PathList(#[from] std::env::JoinPathsError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`LauncherError`].
pub type Result<T> = std::result::Result<T, LauncherError>;
