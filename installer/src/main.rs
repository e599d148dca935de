//! venv-bootstrap installer CLI entrypoint.
//!
//! This binary copies the venv-bootstrap launcher into each directory given
//! on the command line, reporting what it found and what it did.

mod install_flow;

use clap::Parser;
use std::borrow::Cow;
use venv_bootstrap_common::{Reporter, StreamReporter, VersionedArtifact, logging};
use venv_bootstrap_installer::cli::Cli;
use venv_bootstrap_installer::error::Result;
use venv_bootstrap_installer::policy::Prompt;
use venv_bootstrap_installer::prompt::TerminalPrompt;
use venv_bootstrap_installer::source::{current_artifact, load_artifact};

fn main() {
    logging::init();
    let cli = Cli::parse();
    let mut reporter = StreamReporter::new(std::io::stderr(), !cli.quiet);
    let mut terminal = if cli.no_interactive {
        None
    } else {
        TerminalPrompt::stdio()
    };
    let prompt = terminal.as_mut().map(|prompt| prompt as &mut dyn Prompt);

    let run_result = run(&cli, &mut reporter, prompt);
    let exit_code = exit_code_for_run_result(run_result, &mut reporter);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Installs into every requested directory; returns the number of failures.
fn run(cli: &Cli, reporter: &mut dyn Reporter, prompt: Option<&mut dyn Prompt>) -> Result<usize> {
    let artifact = resolve_artifact(cli)?;
    Ok(install_flow::install_directories(
        &cli.directories,
        &artifact,
        cli.policy(),
        reporter,
        prompt,
    ))
}

/// The launcher named on the command line, or the one shipped alongside.
fn resolve_artifact(cli: &Cli) -> Result<Cow<'static, VersionedArtifact>> {
    match &cli.launcher {
        Some(path) => load_artifact(path).map(Cow::Owned),
        None => current_artifact().map(Cow::Borrowed),
    }
}

fn exit_code_for_run_result(result: Result<usize>, reporter: &mut dyn Reporter) -> i32 {
    match result {
        Ok(0) => 0,
        Ok(_) => 1,
        Err(err) => {
            reporter.error(&err.to_string());
            1
        }
    }
}
