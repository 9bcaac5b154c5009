//! Per-request workspace directories.
//!
//! Each in-flight request owns an isolated directory keyed by a unique
//! request id, so concurrent requests never collide and no locking is
//! needed around intermediate artifacts.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::MediaResult;

/// An isolated directory for one request's intermediate artifacts.
#[derive(Debug)]
pub struct RequestWorkspace {
    id: String,
    root: PathBuf,
}

impl RequestWorkspace {
    /// Create a fresh workspace under `base_dir`.
    pub async fn create(base_dir: &Path) -> MediaResult<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        let root = base_dir.join(&id);
        tokio::fs::create_dir_all(&root).await?;
        debug!(request_id = id.as_str(), path = %root.display(), "Created request workspace");
        Ok(Self { id, root })
    }

    /// The unique request id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Non-fatal teardown: removes the directory and everything in it.
    ///
    /// Cleanup failing must never fail the request; a warning is the only
    /// trace it leaves. Runs on both success and failure paths.
    pub async fn cleanup(self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.root).await {
            warn!(
                request_id = self.id.as_str(),
                path = %self.root.display(),
                error = %e,
                "Failed to remove request workspace (non-fatal)"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_cleanup() {
        let base = TempDir::new().unwrap();
        let workspace = RequestWorkspace::create(base.path()).await.unwrap();
        let path = workspace.path().to_path_buf();

        assert!(path.exists());
        tokio::fs::write(path.join("artifact.mp3"), b"bytes")
            .await
            .unwrap();

        workspace.cleanup().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_workspaces_are_isolated() {
        let base = TempDir::new().unwrap();
        let a = RequestWorkspace::create(base.path()).await.unwrap();
        let b = RequestWorkspace::create(base.path()).await.unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_cleanup_of_missing_directory_does_not_panic() {
        let base = TempDir::new().unwrap();
        let workspace = RequestWorkspace::create(base.path()).await.unwrap();
        tokio::fs::remove_dir_all(workspace.path()).await.unwrap();

        // Already gone: cleanup only warns
        workspace.cleanup().await;
    }
}
