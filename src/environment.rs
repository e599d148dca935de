//! Locating, creating and activating the module's virtual environment.

use crate::error::{LauncherError, Result};
use crate::exec::{CommandExecutor, Invocation};
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the environment directory.
pub const ENV_OVERRIDE: &str = "VENV_BOOTSTRAP_ENV";

/// Prefix of the default environment directory name.
pub const DEFAULT_PREFIX: &str = ".venv.";

/// Chooses the environment directory for `module`.
///
/// A non-empty [`ENV_OVERRIDE`] wins over `cli_venv`, which wins over
/// `.venv.<module>` inside `launcher_dir`. Relative paths are kept relative
/// to the working directory.
#[must_use]
pub fn resolve_environment_path(
    cli_venv: Option<&Path>,
    module: &str,
    launcher_dir: &Path,
) -> PathBuf {
    if let Some(path) = env::var_os(ENV_OVERRIDE).filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(path) = cli_venv {
        return path.to_path_buf();
    }
    launcher_dir.join(format!("{DEFAULT_PREFIX}{module}"))
}

/// A provisioned virtual environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    root: PathBuf,
}

impl Environment {
    /// Wraps an environment rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Environment root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the environment's executables.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    /// The environment's interpreter.
    #[must_use]
    pub fn interpreter(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    /// Whether the environment looks usable already.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.root.join("pyvenv.cfg").is_file() && self.interpreter().exists()
    }

    /// Adds the variables of an activated environment to `invocation`.
    ///
    /// Sets `VIRTUAL_ENV`, puts the executables directory first on `PATH`, and
    /// removes `PYTHONHOME`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::PathList`] when the executables directory
    /// cannot be placed on `PATH`.
    pub fn activate(&self, invocation: Invocation) -> Result<Invocation> {
        let inherited = env::var_os("PATH").unwrap_or_default();
        let path = env::join_paths(
            std::iter::once(self.bin_dir()).chain(env::split_paths(&inherited)),
        )?;
        Ok(invocation
            .env("VIRTUAL_ENV", &self.root)
            .env("PATH", path)
            .env_remove("PYTHONHOME"))
    }
}

/// Creates virtual environments.
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentProvisioner {
    /// Creates the environment at `path`, or reuses an existing one.
    ///
    /// # Errors
    ///
    /// Returns an error when the environment cannot be created.
    fn provision(&self, path: &Path) -> Result<Environment>;
}

/// Names tried, in order, when looking for a base interpreter.
pub const BASE_INTERPRETERS: [&str; 2] = ["python3", "python"];

/// Prints the base interpreter's executable and its version.
const PROBE: &str = "\
import os, sys
print(os.path.abspath(getattr(sys, '_base_executable', None) or sys.executable))
print('%d.%d.%d' % sys.version_info[:3])
";

/// What the base interpreter says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseInterpreter {
    /// Real executable of the base installation.
    pub executable: PathBuf,
    /// `major.minor.micro`.
    pub version: String,
}

impl BaseInterpreter {
    /// `major.minor` part of the version.
    #[must_use]
    pub fn short_version(&self) -> &str {
        self.version
            .rsplit_once('.')
            .map_or(self.version.as_str(), |(short, _)| short)
    }

    fn parse(interpreter: &Path, stdout: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(stdout);
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        match (lines.next(), lines.next()) {
            (Some(executable), Some(version)) if version.split('.').count() == 3 => Ok(Self {
                executable: PathBuf::from(executable),
                version: version.to_owned(),
            }),
            _ => Err(LauncherError::InterpreterProbe {
                interpreter: interpreter.to_path_buf(),
                reason: format!("unexpected output {text:?}"),
            }),
        }
    }
}

/// Creates environments with the host Python, without pip or scripts.
pub struct VenvProvisioner<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> VenvProvisioner<'a> {
    /// Creates a provisioner running helpers through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }

    /// Finds the base interpreter on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::PythonNotFound`] when none of
    /// [`BASE_INTERPRETERS`] is on `PATH`.
    pub fn find_base() -> Result<PathBuf> {
        BASE_INTERPRETERS
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| LauncherError::PythonNotFound {
                tried: BASE_INTERPRETERS.join(", "),
            })
    }

    /// Asks `interpreter` for its base executable and version.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::InterpreterProbe`] when the interpreter fails
    /// or prints something unexpected.
    pub fn probe(&self, interpreter: &Path) -> Result<BaseInterpreter> {
        let output = self
            .executor
            .run(&Invocation::new(interpreter).arg("-c").arg(PROBE))?;
        if !output.status.success() {
            return Err(LauncherError::InterpreterProbe {
                interpreter: interpreter.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        BaseInterpreter::parse(interpreter, &output.stdout)
    }

    #[cfg(unix)]
    fn create(&self, environment: &Environment, interpreter: &Path) -> Result<()> {
        let base = self.probe(interpreter)?;
        debug!(
            "laying out {} for Python {} at {}",
            environment.root().display(),
            base.version,
            base.executable.display()
        );
        layout::write(environment, &base).map_err(|err| LauncherError::Provision {
            path: environment.root().to_path_buf(),
            reason: err.to_string(),
        })
    }

    #[cfg(not(unix))]
    fn create(&self, environment: &Environment, interpreter: &Path) -> Result<()> {
        let invocation = Invocation::new(interpreter)
            .args(["-m", "venv", "--without-pip"])
            .arg(environment.root());
        let output = self.executor.run(&invocation)?;
        if output.status.success() {
            return Ok(());
        }
        Err(LauncherError::Provision {
            path: environment.root().to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

impl EnvironmentProvisioner for VenvProvisioner<'_> {
    fn provision(&self, path: &Path) -> Result<Environment> {
        let environment = Environment::new(path);
        if environment.exists() {
            debug!("reusing environment at {}", path.display());
            return Ok(environment);
        }
        let interpreter = Self::find_base()?;
        debug!(
            "creating environment at {} with {}",
            path.display(),
            interpreter.display()
        );
        self.create(&environment, &interpreter)?;
        Ok(environment)
    }
}

/// On-disk layout of an environment, as `python -m venv --without-pip`
/// creates it.
#[cfg(unix)]
mod layout {
    use super::{BaseInterpreter, Environment};
    use std::fs;
    use std::io;
    use std::os::unix::fs::symlink;
    use std::path::Path;

    pub(super) fn write(environment: &Environment, base: &BaseInterpreter) -> io::Result<()> {
        let root = environment.root();
        let bin = environment.bin_dir();
        fs::create_dir_all(&bin)?;
        fs::create_dir_all(root.join("include"))?;
        fs::create_dir_all(
            root.join("lib")
                .join(format!("python{}", base.short_version()))
                .join("site-packages"),
        )?;
        if cfg!(all(target_os = "linux", target_pointer_width = "64")) {
            link_if_missing(Path::new("lib"), &root.join("lib64"))?;
        }

        let home = base.executable.parent().unwrap_or_else(|| Path::new("/"));
        fs::write(
            root.join("pyvenv.cfg"),
            format!(
                "home = {}\ninclude-system-site-packages = false\nversion = {}\nexecutable = {}\n",
                home.display(),
                base.version,
                base.executable.display()
            ),
        )?;

        link_if_missing(&base.executable, &bin.join("python"))?;
        link_if_missing(Path::new("python"), &bin.join("python3"))?;
        link_if_missing(
            Path::new("python"),
            &bin.join(format!("python{}", base.short_version())),
        )?;
        Ok(())
    }

    fn link_if_missing(original: &Path, link: &Path) -> io::Result<()> {
        if fs::symlink_metadata(link).is_ok() {
            return Ok(());
        }
        symlink(original, link)
    }
}
