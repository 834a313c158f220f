//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{config::Config, sandbox::Sandbox};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Execution engine
    sandbox: Sandbox,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(sandbox: Sandbox, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner { sandbox, config }),
        }
    }

    /// Get a reference to the execution engine
    pub fn sandbox(&self) -> &Sandbox {
        &self.inner.sandbox
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
