//! Container engine availability probe

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};

use super::engine::ContainerEngine;

/// Message surfaced to callers when the engine cannot be reached
pub const UNAVAILABLE_MESSAGE: &str = "Docker is not available. Please ensure Docker is running.";

/// Fail-fast liveness check run before any execution is attempted
#[derive(Clone)]
pub struct AvailabilityProbe {
    engine: Arc<dyn ContainerEngine>,
    timeout: Duration,
}

impl AvailabilityProbe {
    pub fn new(engine: Arc<dyn ContainerEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// Ping the engine; any failure, including a slow answer, is `false`
    pub async fn is_available(&self) -> bool {
        match tokio::time::timeout(self.timeout, self.engine.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Container engine unreachable");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Container engine ping timed out"
                );
                false
            }
        }
    }

    /// Like [`is_available`](Self::is_available), as a distinct error
    pub async fn ensure_available(&self) -> AppResult<()> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(AppError::ServiceUnavailable(UNAVAILABLE_MESSAGE.to_string()))
        }
    }
}
