//! venv-bootstrap installer library.
//!
//! This crate places the venv-bootstrap launcher into directories, deciding
//! per directory whether an existing file may be replaced. It is used by the
//! `venv-bootstrap-install` binary and can be driven programmatically.
//!
//! # Modules
//!
//! - [`check`] - Classification of what occupies an install target
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Error types
//! - [`policy`] - Install decisions and confirmation prompts
//! - [`prompt`] - Terminal confirmation prompt
//! - [`source`] - Loading the launcher artifact
//! - [`target`] - Install targets and the atomic write

pub mod check;
pub mod cli;
pub mod error;
pub mod policy;
pub mod prompt;
pub mod source;
pub mod target;

pub use check::CheckOutcome;
pub use policy::{InstallPolicy, Prompt, Resolution, maybe_install};
pub use target::{InstallTarget, SCRIPT_NAME};
