//! End-to-end runs against a local Docker daemon
//!
//! Ignored by default; run with `cargo test -- --ignored` on a host where
//! Docker is up and the language images are present or pullable.

use std::sync::Arc;

use coderunner::{
    config::{DockerConfig, SandboxConfig},
    constants::{sandbox::TIMEOUT_MESSAGE, DEFAULT_DOCKER_SOCKET, DEFAULT_DOCKER_TIMEOUT_SECS},
    models::{ExecutionStatus, TestCase},
    sandbox::{DockerEngine, Sandbox},
};

fn sandbox(root: &std::path::Path) -> Sandbox {
    let engine = DockerEngine::connect(&DockerConfig {
        socket_path: DEFAULT_DOCKER_SOCKET.to_string(),
        timeout_secs: DEFAULT_DOCKER_TIMEOUT_SECS,
    })
    .unwrap();

    Sandbox::new(
        Arc::new(engine),
        SandboxConfig {
            workspace_root: root.to_path_buf(),
            pull_images: true,
            ..SandboxConfig::default()
        },
    )
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_python_echoes_stdin() {
    let root = tempfile::tempdir().unwrap();
    let sandbox = sandbox(root.path());
    assert!(sandbox.is_available().await);

    let result = sandbox
        .execute("print(input()[::-1])", "python", "hello")
        .await;

    assert!(result.succeeded, "{:?}", result);
    assert_eq!(result.stdout.trim(), "olleh");
    assert_eq!(result.stderr, None);
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_python_exception_is_a_runtime_error() {
    let root = tempfile::tempdir().unwrap();
    let result = sandbox(root.path())
        .execute("raise ValueError('bad')", "python", "")
        .await;

    assert!(!result.succeeded);
    assert_eq!(result.status, ExecutionStatus::RuntimeError);
    assert!(result.stderr.unwrap().contains("ValueError"));
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_cpp_syntax_error_is_a_compile_error() {
    let root = tempfile::tempdir().unwrap();
    let result = sandbox(root.path())
        .execute("int main() { return 0 }", "cpp", "")
        .await;

    assert!(!result.succeeded);
    assert_eq!(result.status, ExecutionStatus::CompileError);
    assert!(result.stderr.is_some());
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_infinite_loop_times_out() {
    let root = tempfile::tempdir().unwrap();
    let result = sandbox(root.path())
        .execute("while True:\n    pass\n", "python", "")
        .await;

    assert!(!result.succeeded);
    assert_eq!(result.status, ExecutionStatus::Timeout);
    assert_eq!(result.stderr.as_deref(), Some(TIMEOUT_MESSAGE));
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_java_batch() {
    let root = tempfile::tempdir().unwrap();
    let code = r#"
import java.util.Scanner;
public class Main {
    public static void main(String[] args) {
        Scanner in = new Scanner(System.in);
        int n = in.nextInt();
        System.out.println(n * n);
    }
}
"#;
    let cases = vec![
        TestCase::new("2", "4"),
        TestCase::new("3", "9"),
        TestCase::new("4", "15"),
    ];

    let outcomes = sandbox(root.path()).test_code(code, "java", &cases).await;

    let passed: Vec<bool> = outcomes.iter().map(|o| o.passed).collect();
    assert_eq!(passed, vec![true, true, false]);
    assert_eq!(outcomes[2].actual_output.as_deref(), Some("16"));
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_input_larger_than_an_argument_is_delivered() {
    let root = tempfile::tempdir().unwrap();
    let input = "x".repeat(200 * 1024);

    let result = sandbox(root.path())
        .execute("import sys\nprint(len(sys.stdin.read()))", "python", &input)
        .await;

    assert!(result.succeeded, "{:?}", result);
    assert_eq!(result.stdout.trim(), (200 * 1024 + 1).to_string());
}
