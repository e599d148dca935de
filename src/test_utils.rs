//! Shared test utilities for the launcher crate.

use crate::error::Result;
use crate::exec::{CommandExecutor, Invocation};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a command `Output` with the given exit code and stdout.
pub fn output(code: i32, stdout: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// What an expected invocation returns.
#[derive(Debug)]
pub enum Reply {
    /// Captured output, for [`CommandExecutor::run`].
    Output(Output),
    /// Exit status, for [`CommandExecutor::status`].
    Status(ExitStatus),
}

/// Represents an expected command invocation for testing.
pub struct ExpectedCall {
    /// Checks the invocation; panics on mismatch.
    pub check: Box<dyn Fn(&Invocation)>,
    /// The result to return when this command is invoked.
    pub reply: Result<Reply>,
}

impl ExpectedCall {
    /// Expects an invocation whose arguments start with `prefix`.
    pub fn with_args(prefix: &'static [&'static str], reply: Result<Reply>) -> Self {
        Self {
            check: Box::new(move |invocation| {
                let args: Vec<String> = invocation
                    .arguments()
                    .iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect();
                assert!(
                    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, b)| a == b),
                    "unexpected arguments {args:?}, expected prefix {prefix:?}"
                );
            }),
            reply,
        }
    }

    /// Expects an invocation accepted by `check`.
    pub fn matching(check: impl Fn(&Invocation) + 'static, reply: Result<Reply>) -> Self {
        Self {
            check: Box::new(check),
            reply,
        }
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    seen: RefCell<Vec<Invocation>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Invocations received so far.
    pub fn seen(&self) -> Vec<Invocation> {
        self.seen.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }

    fn next(&self, invocation: &Invocation) -> Result<Reply> {
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command invocation: {invocation}"));
        (call.check)(invocation);
        self.seen.borrow_mut().push(invocation.clone());
        call.reply
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, invocation: &Invocation) -> Result<Output> {
        match self.next(invocation)? {
            Reply::Output(output) => Ok(output),
            Reply::Status(_) => panic!("expected status() for {invocation}"),
        }
    }

    fn status(&self, invocation: &Invocation) -> Result<ExitStatus> {
        match self.next(invocation)? {
            Reply::Status(status) => Ok(status),
            Reply::Output(_) => panic!("expected run() for {invocation}"),
        }
    }
}
