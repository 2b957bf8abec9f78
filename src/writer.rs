//! Header writers: the process boundary of a run.

use crate::error::{Error, Result};
use crate::render::Invocation;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a header writer reported for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Exit status; 0 means success
    pub exit_code: i32,
    /// Captured standard error
    pub stderr: String,
}

impl WriteOutcome {
    /// A successful outcome.
    pub fn success() -> Self {
        Self::default()
    }

    /// A failed outcome.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Check if the call succeeded.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Writes headers into one image per call.
///
/// A call blocks until the write finished. Only a failure to launch is an
/// `Err`; a nonzero exit is reported through [`WriteOutcome`].
pub trait HeaderWriter {
    /// Run `command` with `args`.
    fn write(&mut self, command: &Path, args: &[String]) -> Result<WriteOutcome>;
}

/// Spawns the configured executable for every image.
#[derive(Debug, Default)]
pub struct CommandWriter;

impl CommandWriter {
    /// Create a command writer.
    pub fn new() -> Self {
        Self
    }
}

impl HeaderWriter for CommandWriter {
    fn write(&mut self, command: &Path, args: &[String]) -> Result<WriteOutcome> {
        let output = Command::new(command)
            .args(args)
            .output()
            .map_err(|source| Error::Launch {
                command: command.to_path_buf(),
                source,
            })?;

        // killed by a signal: no exit code
        let exit_code = output.status.code().unwrap_or(-1);
        debug!("{} exited with {}", command.display(), exit_code);

        Ok(WriteOutcome {
            exit_code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Records invocations instead of running them.
#[derive(Debug, Default)]
pub struct DryRunWriter {
    invocations: Vec<Invocation>,
}

impl DryRunWriter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded invocations, in call order.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Consume the recorder.
    pub fn into_invocations(self) -> Vec<Invocation> {
        self.invocations
    }
}

impl HeaderWriter for DryRunWriter {
    fn write(&mut self, command: &Path, args: &[String]) -> Result<WriteOutcome> {
        let invocation = Invocation {
            command: PathBuf::from(command),
            args: args.to_vec(),
        };
        debug!("dry run: {}", invocation);
        self.invocations.push(invocation);
        Ok(WriteOutcome::success())
    }
}
