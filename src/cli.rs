//! CLI argument definitions for the launcher.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Exit code used when a module cannot be run at all.
pub const DEFAULT_FAIL_CODE: i32 = 2;

/// Run a Python module inside a self-provisioned virtual environment.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "venv-bootstrap")]
#[command(version, about)]
#[command(long_about = concat!(
    "Run a Python module inside a self-provisioned virtual environment.\n\n",
    "A streamlined equivalent of `python -m venv <env> && <env>/bin/pip install ",
    "<install> && <env>/bin/python -m <module> ...`: the environment is created on ",
    "first use and the packages are installed only when the module cannot be ",
    "imported.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  VENV_BOOTSTRAP_ENV   Environment directory; overrides --venv\n",
    "  VENV_BOOTSTRAP_LOG   Log filter for diagnostics, e.g. `debug`\n\n",
    "EXAMPLES:\n",
    "  $ venv-bootstrap cowsay 'cowsay>=6' -t hello\n",
    "  $ venv-bootstrap --venv /tmp/env black black -- --check .",
))]
pub struct Cli {
    /// Python module to run.
    pub module: String,

    /// `pip install` arguments, split with shell quoting rules.
    #[arg(allow_hyphen_values = true)]
    pub install: String,

    /// Environment directory [default: `.venv.<MODULE>` next to the launcher].
    #[arg(long, value_name = "PATH")]
    pub venv: Option<PathBuf>,

    /// Report what the launcher is doing.
    #[arg(long)]
    pub verbose: bool,

    /// Number of `--verbose` options passed to pip and ensurepip.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub pip_verbosity: u8,

    /// Exit code returned when the module cannot be run.
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_FAIL_CODE,
        allow_negative_numbers = true
    )]
    pub fail_code: i32,

    /// Arguments passed to the module; use `--` before leading dashes.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}
