//! venv-bootstrap runs a Python module inside a virtual environment that it
//! provisions on first use.
//!
//! A launch happens in two processes. The parent ([`parent`]) resolves and
//! provisions the environment, then starts a second copy of the launcher
//! with the environment activated. That child ([`child`]) runs the module and,
//! when it cannot be imported, installs the requested packages with pip and
//! tries once more.

pub mod child;
pub mod cli;
pub mod environment;
pub mod error;
pub mod exec;
pub mod parent;
pub mod python;
pub mod session;
pub mod signal;

#[cfg(test)]
mod test_utils;

pub use cli::{Cli, DEFAULT_FAIL_CODE};
pub use error::{LauncherError, Result};
pub use session::{CHILD_FLAG, LaunchSession, Role};
