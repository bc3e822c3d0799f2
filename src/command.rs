//! Abstraction over external command calls.
//!
//! Browser detection shells out to OS tools (`google-chrome`, `reg`, `wmic`).
//! Putting those calls behind a trait keeps the detection logic
//! platform-agnostic and lets tests substitute canned output.

use std::process::Command;

use crate::error::Error;

/// Runs an OS command synchronously and captures its standard output.
///
/// No retries and no timeout: a hanging child process blocks the caller.
pub trait CommandRunner: Send + Sync {
    /// Executes `program` with `args` and returns decoded stdout.
    fn run(&self, program: &str, args: &[&str]) -> Result<String, Error>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, Error> {
        let rendered = render(program, args);

        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandNotFound {
                    command: rendered.clone(),
                }
            } else {
                Error::CommandExecution {
                    command: rendered.clone(),
                    source: e,
                }
            }
        })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: rendered,
                status: output.status.code().unwrap_or(-1),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| Error::CommandOutput {
            command: rendered,
            source: e,
        })
    }
}

fn render(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
