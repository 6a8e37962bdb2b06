//! Interactive loop.
//!
//! Reads one line at a time, splits it like a shell would, and dispatches it
//! with the interactive help framing. `quit` or end of input stops the loop.

use std::io::{BufRead, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::dispatcher::{print_output, Dispatcher};
use crate::error::DispatchError;
use crate::help::Framing;

/// Line that ends the loop.
pub const QUIT_COMMAND: &str = "quit";

enum Line {
    Quit,
    Skip,
    Command(String, Vec<String>),
}

fn parse_line<W: Write>(line: &str, out: &mut W) -> std::io::Result<Line> {
    let mut words = match shell_words::split(line) {
        Ok(words) => words,
        Err(e) => {
            tracing::debug!(line, error = %e, "Could not split input line");
            writeln!(out, "Invalid input: {}", e)?;
            return Ok(Line::Skip);
        }
    };
    if words.is_empty() {
        return Ok(Line::Skip);
    }

    let name = words.remove(0);
    if name == QUIT_COMMAND {
        return Ok(Line::Quit);
    }
    Ok(Line::Command(name, words))
}

impl Dispatcher {
    fn prompt<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.prompt.as_bytes())?;
        out.flush()
    }

    /// Run commands read from `input` until `quit` or end of input.
    ///
    /// A failing command ends the loop with its error.
    pub fn run_interactive<R: BufRead, W: Write>(
        &self,
        mut input: R,
        out: &mut W,
    ) -> Result<(), DispatchError> {
        let mut line = String::new();
        loop {
            self.prompt(out)?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            match parse_line(&line, out)? {
                Line::Quit => break,
                Line::Skip => continue,
                Line::Command(name, tokens) => {
                    let outcome = self.dispatch_framed(&name, &tokens, Framing::Interactive, out)?;
                    print_output(&outcome, out)?;
                }
            }
        }
        tracing::debug!("Interactive session ended");
        Ok(())
    }

    /// Async form of [`run_interactive`](Self::run_interactive).
    ///
    /// Waiting for a line yields to the runtime; a running command is awaited
    /// to completion before the next line is read.
    pub async fn run_interactive_async<R, W>(&self, mut input: R, out: &mut W) -> Result<(), DispatchError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut line = String::new();
        loop {
            self.prompt(out)?;
            line.clear();
            if input.read_line(&mut line).await? == 0 {
                break;
            }

            match parse_line(&line, out)? {
                Line::Quit => break,
                Line::Skip => continue,
                Line::Command(name, tokens) => {
                    let outcome = self
                        .dispatch_framed_async(&name, &tokens, Framing::Interactive, out)
                        .await?;
                    print_output(&outcome, out)?;
                }
            }
        }
        tracing::debug!("Interactive session ended");
        Ok(())
    }
}
