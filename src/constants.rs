//! Application-wide constants
//!
//! Defaults for the server, the sandbox limits and the per-language
//! execution profiles. Anything here can be overridden through the
//! environment (see `config.rs`) unless noted otherwise.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// DOCKER DEFAULTS
// =============================================================================

/// Default Docker control socket
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Default timeout for Docker API round trips in seconds
pub const DEFAULT_DOCKER_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// SANDBOX DEFAULTS
// =============================================================================

/// Default root directory for per-execution workspaces
pub const DEFAULT_WORKSPACE_ROOT: &str = "./docker-sandbox";

/// Memory ceiling per environment in megabytes (swap is pinned to the same value)
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 256;

/// Maximum number of processes inside one environment
pub const DEFAULT_PIDS_LIMIT: i64 = 128;

/// Hard wall-clock limit for the run step, enforced inside the environment
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 10;

/// Liveness timeout for reading the run step's output stream
pub const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 5;

/// Limit for the compile step (both in-environment and stream read)
pub const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 30;

/// Upper bound for a single availability ping
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Executions allowed in flight at once per process
pub const DEFAULT_MAX_CONCURRENT_EXECUTIONS: usize = 4;

/// Test cases of one submission run at once (1 = sequential)
pub const DEFAULT_MAX_PARALLEL_TEST_CASES: usize = 1;

/// Maximum stdin size in bytes (1 MB)
pub const MAX_INPUT_SIZE: u64 = 1024 * 1024;

/// Maximum request body size in bytes; room for code plus a full batch
pub const MAX_REQUEST_BODY_SIZE: usize = 8 * 1024 * 1024;

/// Sandbox layout inside an isolated environment (not configurable)
pub mod sandbox {
    /// Bind-mount target for the staged workspace; also the working directory
    pub const MOUNT_PATH: &str = "/sandbox";

    /// Keeps the container alive so compile and run can be exec'd into it
    pub const IDLE_COMMAND: &[&str] = &["sh", "-c", "tail -f /dev/null"];

    /// Prefix for container names and workspace directories
    pub const NAME_PREFIX: &str = "coderunner";

    /// Label carrying the execution id on every container
    pub const EXECUTION_LABEL: &str = "coderunner.execution";

    /// Stdin file inside the workspace, redirected into the run step
    pub const INPUT_FILE: &str = "stdin.txt";

    /// stderr reported when a step ends without producing any output in time
    pub const TIMEOUT_MESSAGE: &str = "Execution timeout";
}

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const PYTHON: &str = "python";
    pub const JAVASCRIPT: &str = "javascript";
    pub const JAVA: &str = "java";
    pub const CPP: &str = "cpp";
    pub const C: &str = "c";
}

/// Container images for each language
pub mod container_images {
    pub const PYTHON: &str = "python:3.11-slim";
    pub const JAVASCRIPT: &str = "node:18-slim";
    pub const JAVA: &str = "openjdk:17-jdk-slim";
    pub const CPP: &str = "gcc:latest";
    pub const C: &str = "gcc:latest";
}
