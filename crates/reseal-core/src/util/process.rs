//! Process execution utilities.

use async_trait::async_trait;
use reseal_types::{ProcessExecutor, ProcessOutput, ResealError, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// Runs external programs on the host via `tokio::process`.
///
/// Commands are awaited one at a time by the caller; this type never runs
/// anything in the background.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    env_vars: HashMap<String, String>,
}

impl SystemExecutor {
    /// Create an executor that inherits the current environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable for every spawned program.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn run(&self, program: &str, args: &[String], stdin: Option<&[u8]>) -> Result<ProcessOutput> {
        debug!("Running {} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| ResealError::Process(format!("Failed to start {}: {}", program, e)))?;

        // Feed stdin while draining stdout/stderr so a chatty child cannot
        // block on a full pipe.
        let pipe = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(data)) = (pipe, stdin) {
                pipe.write_all(data).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output
            .map_err(|e| ResealError::Process(format!("Failed to wait for {}: {}", program, e)))?;

        if let Err(e) = fed {
            // The child may legitimately exit before reading all input.
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(ResealError::Process(format!(
                    "Failed to write stdin of {}: {}",
                    program, e
                )));
            }
            trace!("{} closed stdin early", program);
        }

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status.code().unwrap_or(-1),
        };

        debug!("{} exited with status {}", program, result.status);
        Ok(result)
    }
}

/// Redact secrets from command output.
pub fn redact_secrets(output: &str, secrets: &[&str]) -> String {
    let mut redacted = output.to_string();
    for secret in secrets {
        let secret = secret.trim();
        if !secret.is_empty() {
            redacted = redacted.replace(secret, "***REDACTED***");
        }
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_redact_secrets() {
        let out = "error: key -----BEGIN RSA-----abc----- is invalid";
        let redacted = redact_secrets(out, &["-----BEGIN RSA-----abc-----", ""]);
        assert_eq!(redacted, "error: key ***REDACTED*** is invalid");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_pipes_stdin_to_stdout() {
        let executor = SystemExecutor::new();
        let out = executor
            .run("cat", &[], Some(b"apiVersion: v1\n".as_slice()))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "apiVersion: v1\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_exit_status_and_stderr() {
        let executor = SystemExecutor::new().with_env("RESEAL_TEST_MSG", "denied");
        let args = vec!["-c".to_string(), "echo \"$RESEAL_TEST_MSG\" >&2; exit 3".to_string()];
        let out = executor.run("sh", &args, None).await.unwrap();
        assert_eq!(out.status, 3);
        assert_eq!(out.stderr.trim(), "denied");
        assert_eq!(out.diagnostic(), "exit status 3: denied");
    }

    #[tokio::test]
    async fn test_missing_binary_is_process_error() {
        let executor = SystemExecutor::new();
        let err = executor
            .run("reseal-definitely-not-installed", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ResealError::Process(_)));
    }

    proptest! {
        #[test]
        fn prop_redacted_output_never_contains_secret(
            prefix in "[a-z ]{0,20}",
            secret in "[0-9][A-Za-z0-9+/]{7,31}",
            suffix in "[a-z ]{0,20}",
        ) {
            let output = format!("{}{}{}{}", prefix, secret, suffix, secret);
            let redacted = redact_secrets(&output, &[secret.as_str()]);
            prop_assert!(!redacted.contains(&secret));
        }
    }
}
