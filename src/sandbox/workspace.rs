//! Per-execution staging directories
//!
//! Every execution gets a fresh directory under the configured root that
//! holds the submitted source file, plus the stdin file when there is
//! input, and is bind-mounted into the isolated environment. The
//! [`Workspace`] handle owns that directory: it is deleted on
//! [`Workspace::release`] or, at the latest, when the handle is dropped.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    constants::sandbox::{INPUT_FILE, NAME_PREFIX},
    error::AppResult,
};

use super::languages::LanguageProfile;

/// Creates workspaces under a common root
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a uniquely named directory, write `source_code` into the
    /// profile's source file and, when `input` is non-empty, write it to
    /// the stdin file with a terminating newline
    pub async fn stage(
        &self,
        source_code: &str,
        input: &str,
        profile: &LanguageProfile,
    ) -> AppResult<Workspace> {
        tokio::fs::create_dir_all(&self.root).await?;
        // Bind mounts need an absolute host path
        let root = tokio::fs::canonicalize(&self.root).await?;

        let id = Uuid::new_v4();
        let path = root.join(format!("{}-{}", NAME_PREFIX, id));
        tokio::fs::create_dir(&path).await?;

        // From here on the handle cleans up, including when the write fails
        let mut workspace = Workspace {
            id,
            path,
            has_input: false,
            released: false,
        };

        tokio::fs::write(workspace.path.join(&profile.source_file), source_code).await?;

        if !input.is_empty() {
            let mut contents = input.to_string();
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            tokio::fs::write(workspace.path.join(INPUT_FILE), contents).await?;
            workspace.has_input = true;
        }

        tracing::debug!(
            execution_id = %workspace.id,
            path = %workspace.path.display(),
            source_file = %profile.source_file,
            input_bytes = input.len(),
            "Staged workspace"
        );

        Ok(workspace)
    }
}

/// Exclusive handle to one staged directory
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
    has_input: bool,
    released: bool,
}

impl Workspace {
    /// Execution id; also names the container bound to this workspace
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the stdin file was written
    pub fn has_input(&self) -> bool {
        self.has_input
    }

    /// Recursively delete the directory
    ///
    /// Idempotent. Deletion errors are logged, never returned.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let removed = tokio::fs::remove_dir_all(&self.path).await;
        self.log_removal(removed);
    }

    fn log_removal(&self, removed: std::io::Result<()>) {
        match removed {
            Ok(()) => {
                tracing::debug!(execution_id = %self.id, "Removed workspace");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(execution_id = %self.id, "Workspace already gone");
            }
            Err(e) => {
                tracing::warn!(
                    execution_id = %self.id,
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove workspace"
                );
            }
        }
    }
}

impl Drop for Workspace {
    // Blocking removal; only reached when `release` was skipped
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let removed = std::fs::remove_dir_all(&self.path);
        self.log_removal(removed);
    }
}
