//! Execution response DTOs

use serde::Serialize;

use crate::models::{ExecutionResult, ExecutionStatus, TestOutcome, TestSummary};

/// Result of a single execution
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub succeeded: bool,
    pub status: ExecutionStatus,
    pub stdout: String,
    pub stderr: Option<String>,
    pub elapsed_ms: u64,
}

impl From<ExecutionResult> for ExecutionResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            succeeded: result.succeeded,
            status: result.status,
            elapsed_ms: result.elapsed_ms(),
            stdout: result.stdout,
            stderr: result.stderr,
        }
    }
}

/// Verdict for one test case
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcomeResponse {
    pub input: String,
    pub expected_output: String,
    pub actual_output: Option<String>,
    pub passed: bool,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl From<TestOutcome> for TestOutcomeResponse {
    fn from(outcome: TestOutcome) -> Self {
        Self {
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            input: outcome.input,
            expected_output: outcome.expected_output,
            actual_output: outcome.actual_output,
            passed: outcome.passed,
            error: outcome.error,
        }
    }
}

/// Batch verdict
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunResponse {
    /// Every case passed
    pub success: bool,
    pub results: Vec<TestOutcomeResponse>,
    pub summary: TestSummary,
}

impl From<Vec<TestOutcome>> for TestRunResponse {
    fn from(outcomes: Vec<TestOutcome>) -> Self {
        let summary = TestSummary::from_outcomes(&outcomes);
        Self {
            success: summary.all_passed(),
            results: outcomes.into_iter().map(Into::into).collect(),
            summary,
        }
    }
}
