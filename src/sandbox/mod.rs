//! Sandboxed code execution engine
//!
//! [`Sandbox`] is the entry point callers use:
//!
//! - [`Sandbox::is_available`] checks the container engine before any work
//! - [`Sandbox::execute`] stages the source, provisions an isolated
//!   environment, compiles and runs, and cleans everything up
//! - [`Sandbox::test_code`] runs a batch of test cases through `execute`
//!
//! Each execution owns its workspace and container exclusively; nothing
//! is shared between concurrent calls except the engine connection and the
//! admission limit.

pub mod container;
pub mod demux;
pub mod engine;
pub mod harness;
pub mod languages;
pub mod probe;
pub mod workspace;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::{
    config::SandboxConfig,
    error::AppError,
    models::{ExecutionRequest, ExecutionResult, TestCase, TestOutcome},
};

pub use container::ContainerManager;
pub use engine::{ContainerEngine, DockerEngine};
pub use harness::{CodeExecutor, TestHarness};
pub use languages::{Language, LanguageProfile, LanguageRegistry};
pub use probe::AvailabilityProbe;
pub use workspace::{Workspace, WorkspaceManager};

/// Execution engine facade
pub struct Sandbox {
    registry: LanguageRegistry,
    workspaces: WorkspaceManager,
    containers: ContainerManager,
    probe: AvailabilityProbe,
    admission: Semaphore,
    max_parallel_test_cases: usize,
}

impl Sandbox {
    /// Build the engine around an explicit container engine handle
    pub fn new(engine: Arc<dyn ContainerEngine>, config: SandboxConfig) -> Self {
        Self {
            registry: LanguageRegistry::new(config.images.clone()),
            workspaces: WorkspaceManager::new(config.workspace_root.clone()),
            probe: AvailabilityProbe::new(Arc::clone(&engine), config.probe_timeout),
            admission: Semaphore::new(config.max_concurrent_executions.max(1)),
            max_parallel_test_cases: config.max_parallel_test_cases,
            containers: ContainerManager::new(engine, config),
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn probe(&self) -> &AvailabilityProbe {
        &self.probe
    }

    /// Whether the container engine answers; callers should not execute
    /// anything when this is false
    pub async fn is_available(&self) -> bool {
        self.probe.is_available().await
    }

    /// Run `code` once with `input` on stdin
    ///
    /// Never fails; every error is folded into the result. The workspace
    /// and the container are gone when this returns.
    pub async fn execute(&self, code: &str, language: &str, input: &str) -> ExecutionResult {
        let profile = self.registry.resolve(language);

        let _permit = match self.admission.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return ExecutionResult::setup_failure(&AppError::ServiceUnavailable(
                    "Sandbox is shutting down".to_string(),
                ));
            }
        };

        let mut workspace = match self.workspaces.stage(code, input, &profile).await {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::error!(language = %profile.language, error = %e, "Failed to stage workspace");
                return ExecutionResult::setup_failure(&e);
            }
        };

        let result = self.containers.run(&workspace, &profile).await;
        workspace.release().await;

        result
    }

    /// Run every test case, in order, and report one outcome per case
    pub async fn test_code(&self, code: &str, language: &str, cases: &[TestCase]) -> Vec<TestOutcome> {
        TestHarness::new(self, self.max_parallel_test_cases)
            .test_code(code, language, cases)
            .await
    }
}

#[async_trait]
impl CodeExecutor for Sandbox {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        Sandbox::execute(self, &request.code, &request.language, &request.input).await
    }
}
