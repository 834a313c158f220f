//! Container engine seam
//!
//! [`ContainerEngine`] is the narrow set of operations the orchestrator
//! needs from a container runtime. [`DockerEngine`] implements it over the
//! Docker API with bollard; tests substitute a mock.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::{
    container::LogOutput,
    exec::{CreateExecOptions, StartExecResults},
    models::{ContainerCreateBody, HostConfig},
    query_parameters::{
        CreateContainerOptionsBuilder, CreateImageOptionsBuilder, RemoveContainerOptionsBuilder,
        StartContainerOptions, StopContainerOptionsBuilder,
    },
    Docker,
};
use futures::StreamExt;

use crate::{
    config::DockerConfig,
    error::{AppError, AppResult},
};

use super::demux::{FrameStream, OutputFrame, StreamKind};

/// Everything needed to provision one isolated environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Host directory bind-mounted read/write at `mount_path`
    pub host_path: String,
    pub mount_path: String,
    /// Also used as the swap ceiling, leaving no swap headroom
    pub memory_bytes: i64,
    pub pids_limit: i64,
    pub network_disabled: bool,
    pub auto_remove: bool,
    /// Long-running no-op the environment idles on
    pub command: Vec<String>,
    pub labels: HashMap<String, String>,
}

/// Operations the orchestrator issues against a container runtime
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Lightweight liveness call
    async fn ping(&self) -> AppResult<()>;

    /// Make sure `image` is present locally
    async fn prepare_image(&self, image: &str) -> AppResult<()>;

    /// Create a container and return its id
    async fn create_container(&self, spec: &ContainerSpec) -> AppResult<String>;

    async fn start_container(&self, id: &str) -> AppResult<()>;

    /// Run `command` through `sh -c` inside a started container with
    /// stdout and stderr attached
    async fn exec(&self, id: &str, command: &str) -> AppResult<FrameStream>;

    /// Stop immediately, without a grace period
    async fn stop_container(&self, id: &str) -> AppResult<()>;

    /// Force-remove; succeeds when the container is already gone
    async fn remove_container(&self, id: &str) -> AppResult<()>;
}

/// Docker implementation of [`ContainerEngine`]
#[derive(Debug, Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Connect to the daemon's local socket
    ///
    /// This does not contact the daemon; reachability is checked by the
    /// availability probe.
    pub fn connect(config: &DockerConfig) -> AppResult<Self> {
        let docker = Docker::connect_with_socket(
            &config.socket_path,
            config.timeout_secs,
            bollard::API_DEFAULT_VERSION,
        )?;

        Ok(Self::new(docker))
    }

    /// Daemon version string, for startup logging
    pub async fn version(&self) -> AppResult<String> {
        let version = self.docker.version().await?;
        Ok(version.version.unwrap_or_default())
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ping(&self) -> AppResult<()> {
        self.docker.ping().await?;
        Ok(())
    }

    async fn prepare_image(&self, image: &str) -> AppResult<()> {
        match self.docker.inspect_image(image).await {
            Ok(_) => {
                tracing::debug!(image = %image, "Docker image already present");
                return Ok(());
            }
            Err(e) => {
                let e = AppError::from(e);
                if e.docker_status() != Some(404) {
                    return Err(e);
                }
            }
        }

        tracing::info!(image = %image, "Pulling Docker image");
        let options = CreateImageOptionsBuilder::default().from_image(image).build();
        let mut progress = self.docker.create_image(Some(options), None, None);
        while let Some(step) = progress.next().await {
            step?;
        }
        tracing::info!(image = %image, "Docker image pulled");

        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> AppResult<String> {
        let options = CreateContainerOptionsBuilder::default()
            .name(&spec.name)
            .build();

        let host_config = HostConfig {
            memory: Some(spec.memory_bytes),
            memory_swap: Some(spec.memory_bytes),
            pids_limit: Some(spec.pids_limit),
            network_mode: spec.network_disabled.then(|| "none".to_string()),
            auto_remove: Some(spec.auto_remove),
            binds: Some(vec![format!("{}:{}:rw", spec.host_path, spec.mount_path)]),
            ..Default::default()
        };

        let config = ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            working_dir: Some(spec.mount_path.clone()),
            network_disabled: Some(spec.network_disabled),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            env: Some(vec!["LANG=C.UTF-8".to_string()]),
            labels: Some(spec.labels.clone()),
            host_config: Some(host_config),
            ..Default::default()
        };

        let container = self.docker.create_container(Some(options), config).await?;
        for warning in &container.warnings {
            tracing::warn!(container_id = %container.id, warning = %warning, "Docker create warning");
        }

        Ok(container.id)
    }

    async fn start_container(&self, id: &str) -> AppResult<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await?;
        Ok(())
    }

    async fn exec(&self, id: &str, command: &str) -> AppResult<FrameStream> {
        let exec = self
            .docker
            .create_exec(
                id,
                CreateExecOptions {
                    cmd: Some(vec!["sh", "-c", command]),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        match self.docker.start_exec(&exec.id, None).await? {
            StartExecResults::Attached { output, .. } => Ok(output
                .filter_map(|item| async move {
                    match item {
                        Ok(LogOutput::StdOut { message }) => {
                            Some(Ok(OutputFrame::new(StreamKind::Stdout, message.to_vec())))
                        }
                        Ok(LogOutput::StdErr { message }) => {
                            Some(Ok(OutputFrame::new(StreamKind::Stderr, message.to_vec())))
                        }
                        // Console and stdin echoes are not program output
                        Ok(_) => None,
                        Err(e) => Some(Err(AppError::from(e))),
                    }
                })
                .boxed()),
            StartExecResults::Detached => {
                Err(AppError::Docker("exec started detached".to_string()))
            }
        }
    }

    async fn stop_container(&self, id: &str) -> AppResult<()> {
        let options = StopContainerOptionsBuilder::default().t(0).build();

        match self.docker.stop_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let e = AppError::from(e);
                // 304: already stopped
                if e.docker_status() == Some(304) || e.is_gone() {
                    Ok(())
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn remove_container(&self, id: &str) -> AppResult<()> {
        let options = RemoveContainerOptionsBuilder::default().force(true).build();

        match self.docker.remove_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let e = AppError::from(e);
                if e.is_gone() { Ok(()) } else { Err(e) }
            }
        }
    }
}
