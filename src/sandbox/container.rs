//! Isolated environment orchestration
//!
//! One container per execution: it is created bound to the staged
//! workspace, idles on a no-op command, receives the optional compile step
//! and the run step as execs, and is torn down on every exit path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
    config::SandboxConfig,
    constants::sandbox::{EXECUTION_LABEL, IDLE_COMMAND, INPUT_FILE, MOUNT_PATH, NAME_PREFIX},
    error::AppResult,
    models::ExecutionResult,
};

use super::{
    demux::read_output,
    engine::{ContainerEngine, ContainerSpec},
    languages::LanguageProfile,
    workspace::Workspace,
};

/// Provisions environments and runs profiles inside them
#[derive(Clone)]
pub struct ContainerManager {
    engine: Arc<dyn ContainerEngine>,
    config: SandboxConfig,
}

impl ContainerManager {
    /// Create a new container manager
    pub fn new(engine: Arc<dyn ContainerEngine>, config: SandboxConfig) -> Self {
        Self { engine, config }
    }

    /// Compile (when the profile needs it) and run the workspace's source,
    /// feeding it the workspace's stdin file when one was staged
    ///
    /// Never fails: provisioning problems come back as an
    /// infrastructure-error result with zero elapsed time.
    pub async fn run(&self, workspace: &Workspace, profile: &LanguageProfile) -> ExecutionResult {
        let container = match self.provision(workspace, profile).await {
            Ok(container) => container,
            Err(e) => {
                tracing::error!(
                    execution_id = %workspace.id(),
                    image = %profile.image,
                    error = %e,
                    "Failed to provision environment"
                );
                return ExecutionResult::setup_failure(&e);
            }
        };

        let result = self
            .compile_and_run(container.id(), profile, workspace.has_input())
            .await;

        container.release().await;

        tracing::info!(
            execution_id = %workspace.id(),
            language = %profile.language,
            status = ?result.status,
            elapsed_ms = result.elapsed_ms(),
            "Execution finished"
        );

        result
    }

    /// Create and start an idle container bound to the workspace
    async fn provision(
        &self,
        workspace: &Workspace,
        profile: &LanguageProfile,
    ) -> AppResult<ContainerGuard> {
        if self.config.pull_images {
            self.engine.prepare_image(&profile.image).await?;
        }

        let spec = self.container_spec(workspace, profile);
        let id = self.engine.create_container(&spec).await?;

        // Guard before start so a failed start still tears down
        let container = ContainerGuard::new(Arc::clone(&self.engine), id);
        self.engine.start_container(container.id()).await?;

        tracing::debug!(
            execution_id = %workspace.id(),
            container_id = %container.id(),
            image = %profile.image,
            "Environment started"
        );

        Ok(container)
    }

    fn container_spec(&self, workspace: &Workspace, profile: &LanguageProfile) -> ContainerSpec {
        let mut labels = HashMap::new();
        labels.insert(EXECUTION_LABEL.to_string(), workspace.id().to_string());

        ContainerSpec {
            name: format!("{}-{}", NAME_PREFIX, workspace.id()),
            image: profile.image.clone(),
            host_path: workspace.path().display().to_string(),
            mount_path: MOUNT_PATH.to_string(),
            memory_bytes: self.config.memory_limit_bytes(),
            pids_limit: self.config.pids_limit,
            network_disabled: true,
            auto_remove: true,
            command: IDLE_COMMAND.iter().map(|s| s.to_string()).collect(),
            labels,
        }
    }

    async fn compile_and_run(
        &self,
        container_id: &str,
        profile: &LanguageProfile,
        has_input: bool,
    ) -> ExecutionResult {
        let start = Instant::now();

        if let Some(compile_command) = &profile.compile_command {
            let command = limited(compile_command, self.config.compile_timeout);
            let frames = match self.engine.exec(container_id, &command).await {
                Ok(frames) => frames,
                Err(e) => {
                    tracing::error!(container_id = %container_id, error = %e, "Failed to start compile step");
                    return ExecutionResult::setup_failure(&e);
                }
            };

            let output = read_output(frames, self.config.compile_timeout).await;
            if let Some(stderr) = output.stderr {
                tracing::debug!(container_id = %container_id, "Compilation failed");
                return ExecutionResult::compile_failure(stderr, start.elapsed());
            }
        }

        let command = run_command(profile, has_input, self.config.run_timeout);
        let run_start = Instant::now();
        let frames = match self.engine.exec(container_id, &command).await {
            Ok(frames) => frames,
            Err(e) => {
                tracing::error!(container_id = %container_id, error = %e, "Failed to start run step");
                return ExecutionResult::setup_failure(&e);
            }
        };

        let output = read_output(frames, self.config.stream_timeout).await;
        let hit_wall_clock = run_start.elapsed() >= self.config.run_timeout;

        ExecutionResult::from_run(
            output.stdout,
            output.stderr,
            output.timed_out || hit_wall_clock,
            start.elapsed(),
        )
    }
}

/// Wrap `command` so the environment kills it after `limit`
fn limited(command: &str, limit: Duration) -> String {
    format!("timeout -s KILL {}s {}", limit.as_secs().max(1), command)
}

/// Build the run step, redirecting the staged stdin file when present
///
/// Input never travels inside the command line, which the kernel caps per
/// argument.
fn run_command(profile: &LanguageProfile, has_input: bool, limit: Duration) -> String {
    let run = limited(&profile.run_command, limit);
    if has_input {
        format!("{} < {}/{}", run, MOUNT_PATH, INPUT_FILE)
    } else {
        run
    }
}

/// Owns a provisioned container until it is torn down
///
/// [`ContainerGuard::release`] stops and removes the container. A guard
/// dropped without being released schedules the same teardown on the
/// current runtime.
pub struct ContainerGuard {
    engine: Arc<dyn ContainerEngine>,
    id: String,
    released: bool,
}

impl ContainerGuard {
    pub fn new(engine: Arc<dyn ContainerEngine>, id: String) -> Self {
        Self {
            engine,
            id,
            released: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stop and remove; failures are logged, never returned
    pub async fn release(mut self) {
        self.released = true;
        teardown(self.engine.as_ref(), &self.id).await;
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let engine = Arc::clone(&self.engine);
        let id = std::mem::take(&mut self.id);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    teardown(engine.as_ref(), &id).await;
                });
            }
            Err(_) => {
                tracing::error!(container_id = %id, "No runtime to tear down container; it is leaked");
            }
        }
    }
}

async fn teardown(engine: &dyn ContainerEngine, id: &str) {
    if let Err(e) = engine.stop_container(id).await {
        tracing::warn!(container_id = %id, error = %e, "Failed to stop container");
    }
    // Remove even if stop failed; auto-remove may already have done it
    if let Err(e) = engine.remove_container(id).await {
        tracing::error!(container_id = %id, error = %e, "Failed to remove container");
    } else {
        tracing::debug!(container_id = %id, "Environment torn down");
    }
}
