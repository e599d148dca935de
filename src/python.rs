//! Running Python inside the provisioned environment.
//!
//! Modules run through a small runner program so that a failed import can be
//! told apart from a module that simply exits with an error: the runner
//! writes the import error to a report file whose path it receives in
//! [`REPORT_ENV`], and removes that variable before the module starts.

use crate::error::{LauncherError, Result};
use crate::exec::{CommandExecutor, Invocation, exit_code, require_success};
use log::debug;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming the import-error report file.
pub const REPORT_ENV: &str = "VENV_BOOTSTRAP_IMPORT_REPORT";

/// Runs `sys.argv[1]` as `__main__`, which sees `python -m <module>` as
/// `sys.argv[0]` followed by the remaining arguments.
const RUNNER: &str = "\
import os, runpy, sys
report = os.environ.pop('VENV_BOOTSTRAP_IMPORT_REPORT', None)
module = sys.argv[1]
sys.argv = ['python -m ' + module] + sys.argv[2:]
try:
    runpy.run_module(module, run_name='__main__')
except ImportError as exc:
    if report is None:
        raise
    with open(report, 'w', encoding='utf-8') as stream:
        stream.write(str(exc))
    sys.exit(1)
sys.exit(0)
";

/// Exits 0 when pip can be imported.
const PIP_PROBE: &str =
    "import importlib.util, sys; sys.exit(0 if importlib.util.find_spec('pip') else 1)";

/// How a module run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The module ran; this is its exit code.
    Exited(i32),
    /// The module, or something it imports, could not be imported.
    ImportFailed(String),
}

/// Operations the child needs from the environment's interpreter.
#[cfg_attr(test, mockall::automock)]
pub trait PythonRuntime {
    /// Runs `module` as `__main__` with `args`.
    ///
    /// # Errors
    ///
    /// Returns an error when the interpreter cannot be started.
    fn run_module(&self, module: &str, args: &[OsString]) -> Result<RunOutcome>;

    /// Whether pip is importable.
    ///
    /// # Errors
    ///
    /// Returns an error when the interpreter cannot be started.
    fn has_installer(&self) -> Result<bool>;

    /// Installs pip with `ensurepip`.
    ///
    /// # Errors
    ///
    /// Returns an error when `ensurepip` fails.
    fn bootstrap_installer(&self) -> Result<()>;

    /// Runs `pip install` with `requirements`.
    ///
    /// # Errors
    ///
    /// Returns an error when pip fails.
    fn install(&self, requirements: &[String]) -> Result<()>;
}

/// The interpreter of a provisioned environment.
pub struct EnvironmentPython<'a> {
    interpreter: PathBuf,
    executor: &'a dyn CommandExecutor,
    pip_verbosity: u8,
}

impl<'a> EnvironmentPython<'a> {
    /// Wraps `interpreter`, running it through `executor`.
    #[must_use]
    pub fn new(interpreter: &Path, executor: &'a dyn CommandExecutor, pip_verbosity: u8) -> Self {
        Self {
            interpreter: interpreter.to_path_buf(),
            executor,
            pip_verbosity,
        }
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.interpreter)
    }

    fn verbose_flags(&self) -> impl Iterator<Item = &'static str> {
        std::iter::repeat_n("--verbose", usize::from(self.pip_verbosity))
    }

    fn run_tool(&self, invocation: &Invocation) -> Result<()> {
        let status = self.executor.status(invocation)?;
        require_success(invocation, status)
    }
}

impl PythonRuntime for EnvironmentPython<'_> {
    fn run_module(&self, module: &str, args: &[OsString]) -> Result<RunOutcome> {
        let report_dir = tempfile::Builder::new()
            .prefix("venv-bootstrap-")
            .tempdir()?;
        let report = report_dir.path().join("import-error");
        let invocation = self
            .invocation()
            .args(["-c", RUNNER, module])
            .args(args)
            .env(REPORT_ENV, &report);

        let status = self.executor.status(&invocation)?;
        match fs::read_to_string(&report) {
            Ok(message) => {
                debug!("{module}: import failed: {message}");
                Ok(RunOutcome::ImportFailed(message))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Ok(RunOutcome::Exited(exit_code(status)))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn has_installer(&self) -> Result<bool> {
        let output = self.executor.run(&self.invocation().args(["-c", PIP_PROBE]))?;
        Ok(output.status.success())
    }

    fn bootstrap_installer(&self) -> Result<()> {
        let invocation = self
            .invocation()
            .args(["-m", "ensurepip", "--altinstall"])
            .args(self.verbose_flags())
            .stdout_to_stderr();
        self.run_tool(&invocation)
    }

    fn install(&self, requirements: &[String]) -> Result<()> {
        let invocation = self
            .invocation()
            .args(["-m", "pip"])
            .args(self.verbose_flags())
            .arg("install")
            .args(requirements)
            .stdout_to_stderr();
        self.run_tool(&invocation)
    }
}

/// Splits an install specification with shell quoting rules.
///
/// # Errors
///
/// Returns [`LauncherError::InvalidInstallSpec`] for unbalanced quotes.
///
/// # Examples
///
/// ```
/// use venv_bootstrap::python::split_requirements;
///
/// let tokens = split_requirements("black 'click >= 8'")?;
/// assert_eq!(tokens, ["black", "click >= 8"]);
/// # Ok::<(), venv_bootstrap::error::LauncherError>(())
/// ```
pub fn split_requirements(spec: &str) -> Result<Vec<String>> {
    shlex::split(spec).ok_or_else(|| LauncherError::InvalidInstallSpec {
        spec: spec.to_owned(),
    })
}
