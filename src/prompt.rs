//! Interactive prompts.

use std::io::{self, BufRead, Write};
use thiserror::Error;

/// A prompt error.
#[derive(Debug, Error)]
pub enum Error {
    /// The input ended before an answer was given.
    #[error("No input received for {0}")]
    NoInput(String),

    /// A new password did not match its confirmation.
    #[error("Passwords do not match.")]
    Mismatch,

    /// An error reading or writing the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Asks questions on `output` and reads answers from `input`.
#[derive(Debug)]
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Creates a new prompt.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks for `label` and returns the answer without its line ending.
    pub fn ask(&mut self, label: &str) -> Result<String, Error> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::NoInput(label.to_string()));
        }
        let answer = line.trim_end_matches(['\r', '\n']);
        Ok(answer.to_string())
    }

    /// Asks for a new password twice, failing if the answers differ.
    pub fn ask_new_password(&mut self) -> Result<String, Error> {
        let password = self.ask("Password")?;
        let confirmation = self.ask("Repeat for confirmation")?;
        if password != confirmation {
            return Err(Error::Mismatch);
        }
        Ok(password)
    }
}
