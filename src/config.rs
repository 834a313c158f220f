//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    container_images, DEFAULT_COMPILE_TIMEOUT_SECS, DEFAULT_DOCKER_SOCKET,
    DEFAULT_DOCKER_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_EXECUTIONS,
    DEFAULT_MAX_PARALLEL_TEST_CASES, DEFAULT_MEMORY_LIMIT_MB, DEFAULT_PIDS_LIMIT,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_RUN_TIMEOUT_SECS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_STREAM_TIMEOUT_SECS, DEFAULT_WORKSPACE_ROOT,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub docker: DockerConfig,
    pub sandbox: SandboxConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Docker engine connection
#[derive(Debug, Clone)]
pub struct DockerConfig {
    pub socket_path: String,
    pub timeout_secs: u64,
}

/// Limits and layout for isolated executions
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Host directory under which per-execution workspaces are staged
    pub workspace_root: PathBuf,
    pub memory_limit_mb: u64,
    pub pids_limit: i64,
    /// Wall-clock limit enforced by `timeout` inside the environment
    pub run_timeout: Duration,
    /// Liveness limit for reading the run step's output
    pub stream_timeout: Duration,
    pub compile_timeout: Duration,
    pub probe_timeout: Duration,
    pub max_concurrent_executions: usize,
    pub max_parallel_test_cases: usize,
    /// Pull missing images before provisioning
    pub pull_images: bool,
    pub images: ContainerImages,
}

/// Image per supported language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImages {
    pub python: String,
    pub javascript: String,
    pub java: String,
    pub cpp: String,
    pub c: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            docker: DockerConfig::from_env()?,
            sandbox: SandboxConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl DockerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            socket_path: env::var("DOCKER_SOCKET")
                .unwrap_or_else(|_| DEFAULT_DOCKER_SOCKET.to_string()),
            timeout_secs: parse_var("DOCKER_TIMEOUT_SECS", DEFAULT_DOCKER_TIMEOUT_SECS)?,
        })
    }
}

impl SandboxConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            workspace_root: PathBuf::from(
                env::var("SANDBOX_WORKSPACE_ROOT")
                    .unwrap_or_else(|_| DEFAULT_WORKSPACE_ROOT.to_string()),
            ),
            memory_limit_mb: parse_var("SANDBOX_MEMORY_LIMIT_MB", DEFAULT_MEMORY_LIMIT_MB)?,
            pids_limit: parse_var("SANDBOX_PIDS_LIMIT", DEFAULT_PIDS_LIMIT)?,
            run_timeout: Duration::from_secs(parse_var(
                "SANDBOX_RUN_TIMEOUT_SECS",
                DEFAULT_RUN_TIMEOUT_SECS,
            )?),
            stream_timeout: Duration::from_secs(parse_var(
                "SANDBOX_STREAM_TIMEOUT_SECS",
                DEFAULT_STREAM_TIMEOUT_SECS,
            )?),
            compile_timeout: Duration::from_secs(parse_var(
                "SANDBOX_COMPILE_TIMEOUT_SECS",
                DEFAULT_COMPILE_TIMEOUT_SECS,
            )?),
            probe_timeout: Duration::from_secs(parse_var(
                "SANDBOX_PROBE_TIMEOUT_SECS",
                DEFAULT_PROBE_TIMEOUT_SECS,
            )?),
            max_concurrent_executions: parse_var(
                "SANDBOX_MAX_CONCURRENT_EXECUTIONS",
                DEFAULT_MAX_CONCURRENT_EXECUTIONS,
            )?,
            max_parallel_test_cases: parse_var(
                "SANDBOX_MAX_PARALLEL_TEST_CASES",
                DEFAULT_MAX_PARALLEL_TEST_CASES,
            )?,
            pull_images: parse_var("SANDBOX_PULL_IMAGES", true)?,
            images: ContainerImages::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every execution fail or hang
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_limit_mb == 0 {
            return Err(ConfigError::InvalidValue("SANDBOX_MEMORY_LIMIT_MB".to_string()));
        }
        if self.run_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("SANDBOX_RUN_TIMEOUT_SECS".to_string()));
        }
        if self.stream_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("SANDBOX_STREAM_TIMEOUT_SECS".to_string()));
        }
        if self.compile_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("SANDBOX_COMPILE_TIMEOUT_SECS".to_string()));
        }
        if self.max_concurrent_executions == 0 {
            return Err(ConfigError::InvalidValue(
                "SANDBOX_MAX_CONCURRENT_EXECUTIONS".to_string(),
            ));
        }
        if self.max_parallel_test_cases == 0 {
            return Err(ConfigError::InvalidValue(
                "SANDBOX_MAX_PARALLEL_TEST_CASES".to_string(),
            ));
        }
        Ok(())
    }

    /// Memory ceiling in bytes, as the engine expects it
    pub fn memory_limit_bytes(&self) -> i64 {
        (self.memory_limit_mb * 1024 * 1024) as i64
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            pids_limit: DEFAULT_PIDS_LIMIT,
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
            stream_timeout: Duration::from_secs(DEFAULT_STREAM_TIMEOUT_SECS),
            compile_timeout: Duration::from_secs(DEFAULT_COMPILE_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            max_concurrent_executions: DEFAULT_MAX_CONCURRENT_EXECUTIONS,
            max_parallel_test_cases: DEFAULT_MAX_PARALLEL_TEST_CASES,
            pull_images: true,
            images: ContainerImages::default(),
        }
    }
}

impl ContainerImages {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            python: env::var("IMAGE_PYTHON").unwrap_or(defaults.python),
            javascript: env::var("IMAGE_JAVASCRIPT").unwrap_or(defaults.javascript),
            java: env::var("IMAGE_JAVA").unwrap_or(defaults.java),
            cpp: env::var("IMAGE_CPP").unwrap_or(defaults.cpp),
            c: env::var("IMAGE_C").unwrap_or(defaults.c),
        }
    }
}

impl Default for ContainerImages {
    fn default() -> Self {
        Self {
            python: container_images::PYTHON.to_string(),
            javascript: container_images::JAVASCRIPT.to_string(),
            java: container_images::JAVA.to_string(),
            cpp: container_images::CPP.to_string(),
            c: container_images::C.to_string(),
        }
    }
}

/// Read `name` from the environment, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
