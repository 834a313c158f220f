//! Coderunner - Sandboxed Code Execution Service
//!
//! This library runs untrusted source code in short-lived, isolated Docker
//! containers and reports what it printed.
//!
//! # Features
//!
//! - Multi-language support (Python, JavaScript, Java, C++, C)
//! - One container per execution: no network, capped memory and processes
//! - Wall-clock and output-stream timeouts
//! - Batch runs against input/expected-output test cases
//! - Availability probe so callers can refuse work while Docker is down
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Sandbox**: language profiles, workspaces, containers, output
//!   demultiplexing, test harness and the availability probe
//! - **Models**: Execution results and test verdicts

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod sandbox;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use sandbox::Sandbox;
pub use state::AppState;
