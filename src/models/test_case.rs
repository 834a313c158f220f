//! Test case models

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::execution::ExecutionResult;

/// One input/expected-output pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
    /// Visibility to the end user; the engine ignores it
    #[serde(default)]
    pub is_hidden: bool,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            is_hidden: false,
        }
    }
}

/// Verdict for a single test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub input: String,
    /// Trimmed
    pub expected_output: String,
    /// Trimmed; absent when the program printed nothing
    pub actual_output: Option<String>,
    pub passed: bool,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl TestOutcome {
    /// Compare an execution against the case's expected output
    pub fn evaluate(case: &TestCase, result: ExecutionResult) -> Self {
        let expected_output = case.expected_output.trim().to_string();
        let actual_output = Some(result.stdout.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let passed = result.succeeded && actual_output.as_deref() == Some(expected_output.as_str());

        Self {
            input: case.input.clone(),
            expected_output,
            actual_output,
            passed,
            error: result.stderr,
            elapsed: result.elapsed,
        }
    }
}

/// Aggregate over a batch of outcomes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub passed: usize,
    pub total: usize,
    pub pass_rate: f64,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl TestSummary {
    pub fn from_outcomes(outcomes: &[TestOutcome]) -> Self {
        let passed = outcomes.iter().filter(|o| o.passed).count();
        let total = outcomes.len();
        let pass_rate = if total > 0 {
            passed as f64 / total as f64
        } else {
            0.0
        };

        Self {
            passed,
            total,
            pass_rate,
            elapsed: outcomes.iter().map(|o| o.elapsed).sum(),
        }
    }

    /// Every case passed (and there was at least one)
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(stdout: &str) -> ExecutionResult {
        ExecutionResult::from_run(stdout.to_string(), None, false, Duration::from_millis(10))
    }

    #[test]
    fn test_evaluate_trims_both_sides() {
        let case = TestCase::new("2 2", "  4\n");
        let outcome = TestOutcome::evaluate(&case, ok("4\n\n"));
        assert!(outcome.passed);
        assert_eq!(outcome.expected_output, "4");
        assert_eq!(outcome.actual_output.as_deref(), Some("4"));
    }

    #[test]
    fn test_evaluate_mismatch() {
        let case = TestCase::new("2 3", "5");
        let outcome = TestOutcome::evaluate(&case, ok("4"));
        assert!(!outcome.passed);
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn test_matching_output_with_stderr_fails() {
        let case = TestCase::new("", "4");
        let result = ExecutionResult::from_run(
            "4".to_string(),
            Some("DeprecationWarning".to_string()),
            false,
            Duration::from_millis(10),
        );
        let outcome = TestOutcome::evaluate(&case, result);
        assert!(!outcome.passed);
        assert_eq!(outcome.error.as_deref(), Some("DeprecationWarning"));
    }

    #[test]
    fn test_whitespace_only_output_is_absent() {
        let case = TestCase::new("", "");
        let outcome = TestOutcome::evaluate(&case, ok(" \n"));
        assert_eq!(outcome.actual_output, None);
        assert!(!outcome.passed);
    }

    #[test]
    fn test_summary() {
        let case = TestCase::new("", "1");
        let outcomes = vec![
            TestOutcome::evaluate(&case, ok("1")),
            TestOutcome::evaluate(&case, ok("2")),
        ];
        let summary = TestSummary::from_outcomes(&outcomes);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.pass_rate, 0.5);
        assert_eq!(summary.elapsed, Duration::from_millis(20));
        assert!(!summary.all_passed());

        let empty = TestSummary::from_outcomes(&[]);
        assert_eq!(empty.pass_rate, 0.0);
        assert!(!empty.all_passed());
    }
}
