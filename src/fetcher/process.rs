//! Narrow process invocation interface

use crate::error::FetchError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of one external process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or None if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured standard output (lossy UTF-8)
    pub stdout: String,
    /// Captured standard error (lossy UTF-8)
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best diagnostic text for a failed run: stderr, falling back to stdout
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Runs an executable with arguments and captures its output
///
/// The fetcher builds argument vectors; this trait only knows how to execute them,
/// which keeps the format grammar separate from process mechanics and lets tests
/// script tool behavior without spawning anything.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` to completion
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Spawn`] if the process cannot be started. A non-zero
    /// exit is not an error at this layer.
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, FetchError>;
}

/// [`ProcessRunner`] backed by `tokio::process`
///
/// The child is killed if the awaiting future is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, FetchError> {
        tracing::debug!(program = %program.display(), ?args, "Spawning external tool");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| FetchError::Spawn {
                program: program.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
