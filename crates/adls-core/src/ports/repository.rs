//! Artifact repository port

use crate::error::{ArtifactError, Result};
use adls_types::ArtifactEntry;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path-addressed artifact store.
///
/// Artifact paths are relative to the repository root and use `/`.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Upload a single local file under `artifact_path`
    async fn log_artifact(&self, local_file: &Path, artifact_path: Option<&str>) -> Result<()>;

    /// Upload every file below `local_dir` under `artifact_path`
    async fn log_artifacts(&self, local_dir: &Path, artifact_path: Option<&str>) -> Result<()>;

    /// Direct children of `path` (the root when `None`), sorted by path
    async fn list_artifacts(&self, path: Option<&str>) -> Result<Vec<ArtifactEntry>>;

    /// Download one remote file to `local_path`
    async fn download_file(&self, remote_path: &str, local_path: &Path) -> Result<()>;

    /// Delete artifacts under `artifact_path`
    async fn delete_artifacts(&self, artifact_path: Option<&str>) -> Result<()>;

    /// Download a file or a whole directory tree into `dst_dir`.
    ///
    /// Entries land at `dst_dir/<artifact path>`. A path whose listing is
    /// empty is fetched as a single file, except for the root which becomes
    /// an empty directory. Returns the local path of `artifact_path`.
    async fn download_artifacts(&self, artifact_path: &str, dst_dir: &Path) -> Result<PathBuf> {
        let artifact_path = artifact_path.trim_matches('/');
        let local_root = local_path_for(dst_dir, artifact_path)?;

        let entries = self.list_artifacts(non_empty(artifact_path)).await?;
        if entries.is_empty() && !artifact_path.is_empty() {
            if let Some(parent) = local_root.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            self.download_file(artifact_path, &local_root).await?;
            return Ok(local_root);
        }

        tokio::fs::create_dir_all(&local_root).await?;
        let mut pending = entries;
        while let Some(entry) = pending.pop() {
            let local = local_path_for(dst_dir, &entry.path)?;
            if entry.is_dir {
                tokio::fs::create_dir_all(&local).await?;
                pending.extend(self.list_artifacts(Some(&entry.path)).await?);
            } else {
                debug!(artifact = %entry.path, local = %local.display(), "downloading artifact");
                if let Some(parent) = local.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                self.download_file(&entry.path, &local).await?;
            }
        }

        Ok(local_root)
    }
}

fn non_empty(path: &str) -> Option<&str> {
    (!path.is_empty()).then_some(path)
}

/// Local path of `artifact_path` below `dst_dir`. Paths climbing out of
/// `dst_dir` with `..` are rejected.
fn local_path_for(dst_dir: &Path, artifact_path: &str) -> Result<PathBuf> {
    let mut local = dst_dir.to_path_buf();
    for segment in artifact_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(ArtifactError::InvalidArtifactPath(artifact_path.to_string())),
            segment => local.push(segment),
        }
    }
    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_for() {
        let dst = Path::new("/tmp/dst");
        assert_eq!(local_path_for(dst, "").unwrap(), dst);
        assert_eq!(local_path_for(dst, "a//b/./c").unwrap(), dst.join("a").join("b").join("c"));

        for bad in ["..", "../x", "a/../../etc/passwd"] {
            let err = local_path_for(dst, bad).unwrap_err();
            assert!(matches!(err, ArtifactError::InvalidArtifactPath(ref p) if p == bad));
        }
    }
}
