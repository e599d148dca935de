//! The parent half of a launch: provision, then supervise the child.

use crate::environment::EnvironmentProvisioner;
use crate::error::Result;
use crate::exec::{CommandExecutor, Invocation, exit_code};
use crate::session::{CHILD_FLAG, LaunchSession};
use log::debug;
use std::path::Path;
use venv_bootstrap_common::Reporter;

/// Provisions the session's environment and runs `launcher` as the child.
///
/// Returns the child's exit code unchanged, or the session's fail code when
/// the environment cannot be provisioned or the child cannot be started.
pub fn run(
    session: &LaunchSession,
    launcher: &Path,
    provisioner: &dyn EnvironmentProvisioner,
    executor: &dyn CommandExecutor,
    reporter: &mut dyn Reporter,
) -> i32 {
    match provision_and_spawn(session, launcher, provisioner, executor, reporter) {
        Ok(code) => code,
        Err(err) => {
            reporter.error(&err.to_string());
            session.fail_code
        }
    }
}

fn provision_and_spawn(
    session: &LaunchSession,
    launcher: &Path,
    provisioner: &dyn EnvironmentProvisioner,
    executor: &dyn CommandExecutor,
    reporter: &mut dyn Reporter,
) -> Result<i32> {
    if session.verbose {
        reporter.info(&format!(
            "using environment {}",
            session.environment.display()
        ));
    }
    let environment = provisioner.provision(&session.environment)?;

    let child = session.child(environment.interpreter());
    let invocation =
        environment.activate(Invocation::new(launcher).arg(CHILD_FLAG).arg(child.to_payload()?))?;
    let status = executor.status(&invocation)?;
    debug!("child exited with {status}");
    Ok(exit_code(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Environment, MockEnvironmentProvisioner};
    use crate::error::LauncherError;
    use crate::session::Role;
    use crate::test_utils::{ExpectedCall, Reply, StubExecutor, exit_status};
    use rstest::{fixture, rstest};
    use std::ffi::OsStr;
    use std::path::PathBuf;
    use venv_bootstrap_common::{RecordingReporter, Severity};

    const LAUNCHER: &str = "/opt/tools/venv-bootstrap";

    #[fixture]
    fn session() -> LaunchSession {
        LaunchSession {
            role: Role::Parent,
            module: "tool".to_owned(),
            install: "tool".to_owned(),
            environment: PathBuf::from("/opt/tools/.venv.tool"),
            fail_code: 2,
            verbose: false,
            pip_verbosity: 0,
            args: Vec::new(),
        }
    }

    fn provisioner() -> MockEnvironmentProvisioner {
        let mut provisioner = MockEnvironmentProvisioner::new();
        provisioner
            .expect_provision()
            .withf(|path| path == Path::new("/opt/tools/.venv.tool"))
            .times(1)
            .returning(|path| Ok(Environment::new(path)));
        provisioner
    }

    #[rstest]
    #[case::success(0)]
    #[case::module_code(42)]
    fn child_exit_code_is_returned_verbatim(session: LaunchSession, #[case] code: i32) {
        let executor = StubExecutor::new(vec![ExpectedCall::matching(
            |invocation| {
                assert_eq!(invocation.program(), Path::new(LAUNCHER));
                let args = invocation.arguments();
                assert_eq!(args.len(), 2);
                assert_eq!(args.first().map(|arg| arg.as_os_str()), Some(OsStr::new(CHILD_FLAG)));
                assert!(invocation.env_value("VIRTUAL_ENV").is_some());
                assert!(invocation.removes_env("PYTHONHOME"));
            },
            Ok(Reply::Status(exit_status(code))),
        )]);

        let mut reporter = RecordingReporter::new();
        let result = run(
            &session,
            Path::new(LAUNCHER),
            &provisioner(),
            &executor,
            &mut reporter,
        );

        assert_eq!(result, code);
        assert!(reporter.entries().is_empty());
        executor.assert_finished();
    }

    #[rstest]
    fn child_receives_a_child_session(session: LaunchSession) {
        let executor = StubExecutor::new(vec![ExpectedCall::matching(
            |invocation| {
                let payload = invocation
                    .arguments()
                    .get(1)
                    .and_then(|arg| arg.to_str())
                    .expect("payload is UTF-8");
                let child = LaunchSession::from_payload(payload).expect("payload decodes");
                assert_eq!(
                    child.interpreter().expect("child role"),
                    Environment::new("/opt/tools/.venv.tool").interpreter()
                );
                assert_eq!(child.module, "tool");
            },
            Ok(Reply::Status(exit_status(0))),
        )]);

        let mut reporter = RecordingReporter::new();
        run(
            &session,
            Path::new(LAUNCHER),
            &provisioner(),
            &executor,
            &mut reporter,
        );
        executor.assert_finished();
    }

    #[rstest]
    fn provisioning_failure_uses_fail_code(mut session: LaunchSession) {
        session.fail_code = 9;
        let mut provisioner = MockEnvironmentProvisioner::new();
        provisioner.expect_provision().returning(|_| {
            Err(LauncherError::PythonNotFound {
                tried: "python3, python".to_owned(),
            })
        });
        let executor = StubExecutor::new(Vec::new());

        let mut reporter = RecordingReporter::new();
        let result = run(
            &session,
            Path::new(LAUNCHER),
            &provisioner,
            &executor,
            &mut reporter,
        );

        assert_eq!(result, 9);
        assert_eq!(reporter.count(Severity::Error), 1);
        assert!(executor.seen().is_empty());
    }

    #[rstest]
    fn verbose_parent_names_the_environment(mut session: LaunchSession) {
        session.verbose = true;
        let executor = StubExecutor::new(vec![ExpectedCall::with_args(
            &[],
            Ok(Reply::Status(exit_status(0))),
        )]);

        let mut reporter = RecordingReporter::new();
        run(
            &session,
            Path::new(LAUNCHER),
            &provisioner(),
            &executor,
            &mut reporter,
        );

        assert!(
            reporter
                .messages(Severity::Info)
                .any(|line| line.contains(".venv.tool"))
        );
    }
}
