//! venv-bootstrap launcher entrypoint.
//!
//! The same binary plays both halves of a launch: invoked by a user it
//! provisions the environment and supervises the child; invoked with
//! [`CHILD_FLAG`] it runs the module inside that environment.

use clap::Parser;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use venv_bootstrap::cli::Cli;
use venv_bootstrap::environment::{VenvProvisioner, resolve_environment_path};
use venv_bootstrap::exec::SystemCommandExecutor;
use venv_bootstrap::python::EnvironmentPython;
use venv_bootstrap::{CHILD_FLAG, DEFAULT_FAIL_CODE, LaunchSession, child, parent};
use venv_bootstrap_common::{Reporter, StreamReporter, logging};

/// Which half of the launch the command line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Entry {
    Parent,
    Child(OsString),
}

fn main() {
    logging::init();
    // Keeps the launcher's identity stamp in the binary.
    std::hint::black_box(venv_bootstrap_common::STAMP);

    let code = match entry(std::env::args_os()) {
        Entry::Parent => run_parent(Cli::parse()),
        Entry::Child(payload) => run_child(&payload),
    };
    std::process::exit(code);
}

fn entry(args: impl IntoIterator<Item = OsString>) -> Entry {
    let mut args = args.into_iter().skip(1);
    match args.next() {
        Some(flag) if flag == CHILD_FLAG => Entry::Child(args.next().unwrap_or_default()),
        _ => Entry::Parent,
    }
}

fn run_parent(cli: Cli) -> i32 {
    let mut reporter = StreamReporter::new(std::io::stderr(), cli.verbose);
    let launcher = match std::env::current_exe() {
        Ok(path) => path,
        Err(err) => {
            reporter.error(&format!("cannot locate the launcher: {err}"));
            return cli.fail_code;
        }
    };
    let launcher_dir = invoked_dir(std::env::args_os().next().as_deref(), &launcher);
    let environment = resolve_environment_path(cli.venv.as_deref(), &cli.module, &launcher_dir);
    let session = LaunchSession::from_cli(cli, environment);

    let executor = SystemCommandExecutor;
    let provisioner = VenvProvisioner::new(&executor);
    parent::run(&session, &launcher, &provisioner, &executor, &mut reporter)
}

/// Directory the launcher was invoked from.
///
/// A path in `argv[0]` is used as given, so a symlinked launcher keeps its
/// environment next to the link. A bare name found on `PATH` falls back to
/// the directory of `current_exe`.
fn invoked_dir(argv0: Option<&OsStr>, current_exe: &Path) -> PathBuf {
    argv0
        .map(Path::new)
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(|| current_exe.parent())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

fn run_child(payload: &OsStr) -> i32 {
    let mut reporter = StreamReporter::new(std::io::stderr(), false);
    let decoded = payload
        .to_str()
        .ok_or_else(|| "child session is not valid UTF-8".to_owned())
        .and_then(|text| LaunchSession::from_payload(text).map_err(|err| err.to_string()));
    let session = match decoded {
        Ok(session) => session,
        Err(message) => {
            reporter.error(&message);
            return DEFAULT_FAIL_CODE;
        }
    };
    let interpreter = match session.interpreter() {
        Ok(path) => path.to_path_buf(),
        Err(err) => {
            reporter.error(&err.to_string());
            return session.fail_code;
        }
    };

    let mut reporter = StreamReporter::new(std::io::stderr(), session.verbose);
    let executor = SystemCommandExecutor;
    let python = EnvironmentPython::new(&interpreter, &executor, session.pip_verbosity);
    child::run(&session, &python, &mut reporter)
}
