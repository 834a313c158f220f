//! Execution handler implementations

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    constants::MAX_INPUT_SIZE,
    error::{AppError, AppResult},
    state::AppState,
};

use super::{
    request::{ExecuteRequest, TestRequest},
    response::{ExecutionResponse, TestRunResponse},
};

/// Run code once
pub async fn execute_code(
    State(state): State<AppState>,
    Json(payload): Json<ExecuteRequest>,
) -> AppResult<Json<ExecutionResponse>> {
    payload.validate()?;

    // Refuse up front rather than absorbing a slow provisioning failure
    state.sandbox().probe().ensure_available().await?;

    let result = state
        .sandbox()
        .execute(&payload.code, &payload.language, &payload.input)
        .await;

    Ok(Json(result.into()))
}

/// Run code against every test case
pub async fn test_code(
    State(state): State<AppState>,
    Json(payload): Json<TestRequest>,
) -> AppResult<Json<TestRunResponse>> {
    payload.validate()?;

    let oversized = payload.test_cases.iter().position(|case| {
        case.input.len() as u64 > MAX_INPUT_SIZE || case.expected_output.len() as u64 > MAX_INPUT_SIZE
    });
    if let Some(index) = oversized {
        return Err(AppError::InvalidInput(format!(
            "Test case {} exceeds the maximum size of {} bytes",
            index, MAX_INPUT_SIZE
        )));
    }

    state.sandbox().probe().ensure_available().await?;

    let outcomes = state
        .sandbox()
        .test_code(&payload.code, &payload.language, &payload.test_cases)
        .await;

    Ok(Json(outcomes.into()))
}
