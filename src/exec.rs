//! Running external programs.
//!
//! All subprocesses go through [`CommandExecutor`] so the launcher's control
//! flow can be exercised without spawning anything.

use crate::error::{LauncherError, Result};
use crate::signal::InterruptGuard;
use log::debug;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

/// A program with its arguments and environment changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    env_remove: Vec<OsString>,
    stdout_to_stderr: bool,
}

impl Invocation {
    /// Starts an invocation of `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            env_remove: Vec::new(),
            stdout_to_stderr: false,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Sets an environment variable for the program.
    #[must_use]
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Removes an inherited environment variable.
    #[must_use]
    pub fn env_remove(mut self, key: impl AsRef<OsStr>) -> Self {
        self.env_remove.push(key.as_ref().to_os_string());
        self
    }

    /// Sends the program's standard output to our standard error.
    #[must_use]
    pub const fn stdout_to_stderr(mut self) -> Self {
        self.stdout_to_stderr = true;
        self
    }

    /// The program to run.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments passed to the program.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Value set for `key`, if any.
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_os_str())
    }

    /// Whether `key` is removed from the inherited environment.
    #[must_use]
    pub fn removes_env(&self, key: &str) -> bool {
        self.env_remove.iter().any(|name| name == key)
    }

    /// Whether standard output is redirected to standard error.
    #[must_use]
    pub const fn redirects_stdout(&self) -> bool {
        self.stdout_to_stderr
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        for key in &self.env_remove {
            command.env_remove(key);
        }
        command.envs(self.envs.iter().map(|(key, value)| (key, value)));
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> LauncherError {
        LauncherError::Spawn {
            program: self.to_string(),
            source,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command and returns its captured output.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Spawn`] when the program cannot be started.
    fn run(&self, invocation: &Invocation) -> Result<Output>;

    /// Runs a command with inherited standard streams and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Spawn`] when the program cannot be started.
    fn status(&self, invocation: &Invocation) -> Result<ExitStatus>;
}

/// Executes commands on the host system.
///
/// While waiting on a program with inherited streams, interrupts are left to
/// the program: the launcher itself keeps running until the program exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, invocation: &Invocation) -> Result<Output> {
        debug!("running {invocation}");
        invocation
            .command()
            .output()
            .map_err(|err| invocation.spawn_error(err))
    }

    fn status(&self, invocation: &Invocation) -> Result<ExitStatus> {
        debug!("running {invocation} with inherited streams");
        let mut command = invocation.command();
        if invocation.stdout_to_stderr {
            command.stdout(Stdio::from(std::io::stderr()));
        }
        let _guard = InterruptGuard::install();
        command.status().map_err(|err| invocation.spawn_error(err))
    }
}

/// Exit code to report for `status`.
///
/// A program killed by a signal maps to `128 + signal`, as shells report it.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    signal_exit_code(status).unwrap_or(1)
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|signal| 128 + signal)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> Option<i32> {
    None
}

/// Fails with [`LauncherError::CommandFailed`] unless `status` is a success.
///
/// # Errors
///
/// Returns [`LauncherError::CommandFailed`] naming `invocation`.
pub fn require_success(invocation: &Invocation, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(LauncherError::CommandFailed {
        command: invocation.to_string(),
        code: exit_code(status),
    })
}
