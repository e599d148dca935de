//! The child half of a launch: run the module, installing it once if needed.

use crate::error::{LauncherError, Result};
use crate::python::{PythonRuntime, RunOutcome, split_requirements};
use crate::session::LaunchSession;
use log::debug;
use venv_bootstrap_common::Reporter;

/// Runs the session's module and returns the exit code for the process.
///
/// The module's own exit code is returned when it runs. When it cannot be
/// imported, packages are installed once and the module is tried again;
/// anything that stops it from running ends with the session's fail code and
/// an error line naming the module.
pub fn run(session: &LaunchSession, python: &dyn PythonRuntime, reporter: &mut dyn Reporter) -> i32 {
    match run_with_self_heal(session, python, reporter) {
        Ok(code) => code,
        Err(err) => {
            reporter.error(&format!("cannot run module {}: {err}", session.module));
            session.fail_code
        }
    }
}

fn run_with_self_heal(
    session: &LaunchSession,
    python: &dyn PythonRuntime,
    reporter: &mut dyn Reporter,
) -> Result<i32> {
    let module = session.module.as_str();
    let message = match python.run_module(module, &session.args)? {
        RunOutcome::Exited(code) => return Ok(code),
        RunOutcome::ImportFailed(message) => message,
    };

    if session.verbose {
        reporter.info(&format!(
            "failed to import {module} ({message}), installing {:?} with pip",
            session.install
        ));
    }

    if !python.has_installer()? {
        if session.verbose {
            reporter.info("bootstrapping pip with ensurepip");
        }
        python.bootstrap_installer()?;
    }

    let requirements = split_requirements(&session.install)?;
    debug!("installing {requirements:?} for {module}");
    python.install(&requirements)?;

    match python.run_module(module, &session.args)? {
        RunOutcome::Exited(code) => Ok(code),
        RunOutcome::ImportFailed(message) => Err(LauncherError::StillNotImportable { message }),
    }
}
