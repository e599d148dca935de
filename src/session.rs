//! The launch session shared by the two launcher processes.
//!
//! The parent builds a session from the command line, provisions the
//! environment, and hands a child session to a second copy of itself running
//! under the environment's interpreter. The child receives the session as a
//! JSON payload after [`CHILD_FLAG`] and never parses the user-facing
//! arguments again.

use crate::cli::Cli;
use crate::error::{LauncherError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Hidden flag introducing the child's session payload.
pub const CHILD_FLAG: &str = "--child";

/// Which half of the launch this process performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    /// Provisions the environment and supervises the child.
    Parent,
    /// Runs the module with the environment's interpreter.
    Child {
        /// Interpreter inside the provisioned environment.
        interpreter: PathBuf,
    },
}

/// Everything needed to run one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSession {
    /// Role of the process holding this session.
    pub role: Role,
    /// Module to run.
    pub module: String,
    /// Unsplit `pip install` arguments.
    pub install: String,
    /// Environment root.
    pub environment: PathBuf,
    /// Exit code used when the module cannot be run.
    pub fail_code: i32,
    /// Whether progress lines are shown.
    pub verbose: bool,
    /// Number of `--verbose` flags for pip.
    pub pip_verbosity: u8,
    /// Arguments passed to the module.
    pub args: Vec<OsString>,
}

impl LaunchSession {
    /// Parent session for `cli`, using the already resolved `environment`.
    #[must_use]
    pub fn from_cli(cli: Cli, environment: PathBuf) -> Self {
        Self {
            role: Role::Parent,
            module: cli.module,
            install: cli.install,
            environment,
            fail_code: cli.fail_code,
            verbose: cli.verbose,
            pip_verbosity: cli.pip_verbosity,
            args: cli.args,
        }
    }

    /// Child session running under `interpreter`.
    #[must_use]
    pub fn child(&self, interpreter: PathBuf) -> Self {
        Self {
            role: Role::Child { interpreter },
            ..self.clone()
        }
    }

    /// Interpreter of a child session.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::NotAChildSession`] for parent sessions.
    pub fn interpreter(&self) -> Result<&Path> {
        match &self.role {
            Role::Child { interpreter } => Ok(interpreter),
            Role::Parent => Err(LauncherError::NotAChildSession),
        }
    }

    /// Serialises the session for the command line.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Session`] when serialisation fails.
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a session produced by [`Self::to_payload`].
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Session`] for malformed payloads.
    pub fn from_payload(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}
