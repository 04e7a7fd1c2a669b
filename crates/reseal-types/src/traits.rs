//! Core trait definitions for reseal abstractions.

use async_trait::async_trait;
use crate::errors::Result;

/// Captured result of one external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Everything the program wrote to stdout
    pub stdout: String,
    /// Everything the program wrote to stderr
    pub stderr: String,
    /// Exit code, or -1 when the program was killed by a signal
    pub status: i32,
}

impl ProcessOutput {
    /// Build a successful output carrying `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            status: 0,
        }
    }

    /// Build a failed output with the given exit code and stderr.
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            status,
        }
    }

    /// Whether the program exited with status zero.
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Best available diagnostic: trimmed stderr, or the exit code.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit status {}", self.status)
        } else {
            format!("exit status {}: {}", self.status, stderr)
        }
    }
}

/// Trait for running external programs.
///
/// Every interaction with the cluster client and the sealing CLI goes
/// through this seam, so tests can substitute scripted fakes for the
/// real binaries.
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run `program` with `args`, optionally feeding `stdin`, and wait for
    /// it to exit.
    ///
    /// A non-zero exit is not an error here: it is reported through
    /// [`ProcessOutput::status`]. Errors are reserved for failing to start
    /// or drive the process at all.
    async fn run(&self, program: &str, args: &[String], stdin: Option<&[u8]>) -> Result<ProcessOutput>;
}

/// Trait for narrating a run to the user.
///
/// Orchestration code only talks to this trait, so formatting and output
/// destination stay out of the rotation logic.
pub trait Reporter: Send + Sync {
    /// Start a new phase of the run.
    fn section(&self, title: &str);

    /// Neutral progress message.
    fn info(&self, message: &str);

    /// Something completed successfully.
    fn success(&self, message: &str);

    /// Something failed.
    fn error(&self, message: &str);
}
