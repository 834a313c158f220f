//! Domain models
//!
//! Boundary data shapes exchanged with callers of the execution engine.

pub mod execution;
pub mod test_case;

pub use execution::{ExecutionRequest, ExecutionResult, ExecutionStatus};
pub use test_case::{TestCase, TestOutcome, TestSummary};
