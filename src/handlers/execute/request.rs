//! Execution request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::models::TestCase;

/// Run code once
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    /// Source code
    #[validate(length(min = 1, max = 1048576))] // 1MB max
    pub code: String,

    /// Language identifier; unknown values run as the default language
    #[validate(length(min = 1, max = 20))]
    pub language: String,

    /// Optional stdin
    #[serde(default)]
    #[validate(length(max = 1048576))]
    pub input: String,
}

/// Run code against a batch of test cases
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestRequest {
    #[validate(length(min = 1, max = 1048576))]
    pub code: String,

    #[validate(length(min = 1, max = 20))]
    pub language: String,

    #[validate(length(min = 1, max = 100))]
    pub test_cases: Vec<TestCase>,
}
