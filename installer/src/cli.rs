//! CLI argument definitions for the launcher installer.

use crate::policy::InstallPolicy;
use camino::Utf8PathBuf;
use clap::Parser;
use std::path::PathBuf;

/// Install the venv-bootstrap launcher into directories.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "venv-bootstrap-install")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the venv-bootstrap launcher into directories.\n\n",
    "Each directory receives a copy of the launcher executable. Existing ",
    "launchers are upgraded, kept, or downgraded according to their version; ",
    "files that may not be ours are only replaced with --force or after ",
    "confirmation on a terminal.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install into ~/bin:\n",
    "    $ venv-bootstrap-install ~/bin\n\n",
    "  Replace whatever is there without asking:\n",
    "    $ venv-bootstrap-install --force --no-interactive ~/bin",
))]
pub struct Cli {
    /// Directories to install the launcher into.
    #[arg(value_name = "DIR")]
    pub directories: Vec<Utf8PathBuf>,

    /// Only print warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Keep older launchers instead of upgrading them.
    #[arg(long)]
    pub no_upgrade: bool,

    /// Replace newer launchers with this version.
    #[arg(long)]
    pub downgrade: bool,

    /// Overwrite files that do not look like an intact launcher.
    #[arg(long)]
    pub force: bool,

    /// Never ask for confirmation.
    #[arg(long)]
    pub no_interactive: bool,

    /// Launcher executable to install [default: the one next to this binary].
    #[arg(long, value_name = "PATH")]
    pub launcher: Option<PathBuf>,
}

impl Cli {
    /// Policy applied to every directory.
    #[must_use]
    pub const fn policy(&self) -> InstallPolicy {
        InstallPolicy {
            no_upgrade: self.no_upgrade,
            downgrade: self.downgrade,
            force: self.force,
        }
    }
}
