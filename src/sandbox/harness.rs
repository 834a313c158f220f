//! Test-case harness
//!
//! Runs one execution per test case and compares trimmed output. Every
//! case is run even when earlier ones fail, and outcomes come back in
//! input order.

use async_trait::async_trait;
use futures::{stream, StreamExt};

use crate::models::{ExecutionRequest, ExecutionResult, TestCase, TestOutcome};

/// Anything that can run a single request
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult;
}

/// Drives a [`CodeExecutor`] over a batch of test cases
pub struct TestHarness<'a, E: ?Sized> {
    executor: &'a E,
    max_parallel: usize,
}

impl<'a, E: CodeExecutor + ?Sized> TestHarness<'a, E> {
    /// `max_parallel` bounds how many cases run at once; 1 is sequential
    pub fn new(executor: &'a E, max_parallel: usize) -> Self {
        Self {
            executor,
            max_parallel: max_parallel.max(1),
        }
    }

    pub async fn test_code(&self, code: &str, language: &str, cases: &[TestCase]) -> Vec<TestOutcome> {
        let executor = self.executor;

        // `buffered` keeps results in submission order
        let runs: Vec<_> = cases
            .iter()
            .enumerate()
            .map(|(index, case)| async move {
                let request = ExecutionRequest::new(code, language, case.input.clone());
                let result = executor.execute(request).await;
                let outcome = TestOutcome::evaluate(case, result);

                tracing::debug!(
                    case = index,
                    passed = outcome.passed,
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "Test case finished"
                );

                outcome
            })
            .collect();

        stream::iter(runs)
            .buffered(self.max_parallel)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Adds the two numbers on stdin, except for inputs listed as broken
    struct Adder {
        broken: Vec<&'static str>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl Adder {
        fn new(broken: Vec<&'static str>) -> Self {
            Self {
                broken,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CodeExecutor for Adder {
        async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.input.clone());

            if self.broken.contains(&request.input.as_str()) {
                return ExecutionResult::from_run(
                    String::new(),
                    Some("ValueError: invalid literal".to_string()),
                    false,
                    Duration::from_millis(7),
                );
            }

            let sum: i64 = request
                .input
                .split_whitespace()
                .map(|n| n.parse::<i64>().unwrap())
                .sum();
            ExecutionResult::from_run(format!("{}\n", sum), None, false, Duration::from_millis(7))
        }
    }

    fn cases() -> Vec<TestCase> {
        vec![
            TestCase::new("1 1", "2"),
            TestCase::new("2 2", "5"),
            TestCase::new("3 3", "6\n"),
        ]
    }

    #[tokio::test]
    async fn test_failed_comparison_does_not_stop_the_batch() {
        let adder = Adder::new(vec![]);
        let outcomes = TestHarness::new(&adder, 1).test_code("code", "python", &cases()).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].passed);
        assert!(!outcomes[1].passed);
        assert_eq!(outcomes[1].actual_output.as_deref(), Some("4"));
        assert_eq!(outcomes[1].expected_output, "5");
        assert!(outcomes[2].passed);
        assert_eq!(outcomes[2].expected_output, "6");
        assert_eq!(adder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_outcomes_follow_input_order() {
        let adder = Adder::new(vec![]);
        let outcomes = TestHarness::new(&adder, 1).test_code("code", "python", &cases()).await;

        let inputs: Vec<_> = outcomes.iter().map(|o| o.input.as_str()).collect();
        assert_eq!(inputs, vec!["1 1", "2 2", "3 3"]);
        assert_eq!(*adder.seen.lock().unwrap(), vec!["1 1", "2 2", "3 3"]);
    }

    #[tokio::test]
    async fn test_execution_errors_are_captured_per_case() {
        let adder = Adder::new(vec!["2 2"]);
        let outcomes = TestHarness::new(&adder, 1).test_code("code", "python", &cases()).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].passed);
        assert!(!outcomes[1].passed);
        assert_eq!(outcomes[1].actual_output, None);
        assert_eq!(outcomes[1].error.as_deref(), Some("ValueError: invalid literal"));
        assert!(outcomes[2].passed);
    }

    #[tokio::test]
    async fn test_parallel_cases_keep_order() {
        let adder = Adder::new(vec![]);
        let outcomes = TestHarness::new(&adder, 3).test_code("code", "python", &cases()).await;

        let inputs: Vec<_> = outcomes.iter().map(|o| o.input.as_str()).collect();
        assert_eq!(inputs, vec!["1 1", "2 2", "3 3"]);
        assert_eq!(
            outcomes.iter().map(|o| o.passed).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }

    #[tokio::test]
    async fn test_no_cases() {
        let adder = Adder::new(vec![]);
        let outcomes = TestHarness::new(&adder, 1).test_code("code", "python", &[]).await;

        assert!(outcomes.is_empty());
        assert_eq!(adder.calls.load(Ordering::SeqCst), 0);
    }
}
