//! Interactive confirmation on a terminal.

use crate::policy::Prompt;
use std::io::{self, BufRead, IsTerminal, Write};

/// Asks questions on `output` and reads `y`/`yes` answers from `input`.
///
/// Anything else, including end of input, counts as "no".
#[derive(Debug)]
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Creates a prompt over arbitrary streams.
    #[must_use]
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr when stdin is a terminal.
    #[must_use]
    pub fn stdio() -> Option<Self> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return None;
        }
        Some(Self::new(stdin.lock(), io::stderr()))
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        if write!(self.output, "{question} [y/N] ").is_err() || self.output.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}
