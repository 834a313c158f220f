//! Execution request and result models

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{constants::sandbox::TIMEOUT_MESSAGE, error::AppError};

/// A single piece of code to run. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: String,
    /// Fed to the program's stdin when non-empty
    #[serde(default)]
    pub input: String,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            input: input.into(),
        }
    }
}

/// How an execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    /// The compile step wrote to stderr; the run step was skipped
    CompileError,
    /// The run step wrote to stderr or produced no output
    RuntimeError,
    /// A time limit fired before any output was produced
    Timeout,
    /// The environment could not be provisioned; not a fault of the code
    InfrastructureError,
}

/// Outcome of one execution
///
/// `succeeded` is true only when the program produced stdout and wrote
/// nothing to stderr. Exit codes are not inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub succeeded: bool,
    pub status: ExecutionStatus,
    pub stdout: String,
    pub stderr: Option<String>,
    pub elapsed: Duration,
}

impl ExecutionResult {
    /// Classify captured run output
    ///
    /// `timed_out` is set when either the stream liveness timeout or the
    /// in-environment wall-clock limit was hit.
    pub fn from_run(stdout: String, stderr: Option<String>, timed_out: bool, elapsed: Duration) -> Self {
        let succeeded = stderr.is_none() && !stdout.is_empty();

        let (status, stderr) = if succeeded {
            (ExecutionStatus::Success, None)
        } else if timed_out && stdout.is_empty() {
            (
                ExecutionStatus::Timeout,
                Some(stderr.unwrap_or_else(|| TIMEOUT_MESSAGE.to_string())),
            )
        } else {
            (ExecutionStatus::RuntimeError, stderr)
        };

        Self {
            succeeded,
            status,
            stdout,
            stderr,
            elapsed,
        }
    }

    /// The compile step reported diagnostics on stderr
    pub fn compile_failure(stderr: String, elapsed: Duration) -> Self {
        Self {
            succeeded: false,
            status: ExecutionStatus::CompileError,
            stdout: String::new(),
            stderr: Some(stderr),
            elapsed,
        }
    }

    /// Provisioning or staging failed before any user code ran
    pub fn setup_failure(error: &AppError) -> Self {
        Self {
            succeeded: false,
            status: ExecutionStatus::InfrastructureError,
            stdout: String::new(),
            stderr: Some(error.to_string()),
            elapsed: Duration::ZERO,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_without_stderr_succeeds() {
        let result = ExecutionResult::from_run("42\n".to_string(), None, false, Duration::from_millis(30));
        assert!(result.succeeded);
        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(result.stderr, None);
    }

    #[test]
    fn test_any_stderr_fails() {
        let result = ExecutionResult::from_run(
            "partial".to_string(),
            Some("Traceback (most recent call last)".to_string()),
            false,
            Duration::from_millis(30),
        );
        assert!(!result.succeeded);
        assert_eq!(result.status, ExecutionStatus::RuntimeError);
        assert_eq!(result.stdout, "partial");
    }

    #[test]
    fn test_silent_program_fails_without_error_text() {
        let result = ExecutionResult::from_run(String::new(), None, false, Duration::from_millis(5));
        assert!(!result.succeeded);
        assert_eq!(result.status, ExecutionStatus::RuntimeError);
        assert_eq!(result.stderr, None);
    }

    #[test]
    fn test_timeout_without_output_reports_timeout() {
        let result = ExecutionResult::from_run(String::new(), None, true, Duration::from_secs(5));
        assert!(!result.succeeded);
        assert_eq!(result.status, ExecutionStatus::Timeout);
        assert_eq!(result.stderr.as_deref(), Some(TIMEOUT_MESSAGE));
    }

    #[test]
    fn test_timeout_with_partial_output_is_kept() {
        let result = ExecutionResult::from_run("1\n2\n".to_string(), None, true, Duration::from_secs(5));
        assert!(result.succeeded);
        assert_eq!(result.status, ExecutionStatus::Success);
    }

    #[test]
    fn test_setup_failure_has_zero_elapsed() {
        let result = ExecutionResult::setup_failure(&AppError::Docker("no such image".to_string()));
        assert!(!result.succeeded);
        assert_eq!(result.status, ExecutionStatus::InfrastructureError);
        assert_eq!(result.elapsed, Duration::ZERO);
        assert_eq!(result.stderr.as_deref(), Some("Docker error: no such image"));
    }
}
