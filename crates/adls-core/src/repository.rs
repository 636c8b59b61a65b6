//! Data Lake artifact repository
//!
//! Translates repository-relative artifact paths into absolute Data Lake
//! paths under the base path taken from the `abfss://` URI, and normalizes
//! listings back into repository-relative entries.

use crate::backend::DataLakeRestService;
use crate::config::RepositorySettings;
use crate::error::{ArtifactError, BackendError, Result};
use crate::path;
use crate::ports::{
    ArtifactRepository, DataLakeService, DirectoryClient, FileSystemClient, TokenCredential,
};
use crate::uri::parse_abfss_uri;
use adls_types::{ArtifactEntry, ArtifactLocation, PathItem};
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Stores artifacts on Azure Data Lake Storage Gen2.
///
/// Used with URIs of the form
/// `abfss://<filesystem>@<account>.dfs.core.windows.net/<path>`. Only
/// directory uploads, listing and downloads are supported; single-file
/// logging and deletion always fail with
/// [`ArtifactError::UnsupportedOperation`].
pub struct DataLakeArtifactRepository {
    location: ArtifactLocation,
    fs: Arc<dyn FileSystemClient>,
    timeout: Duration,
}

impl DataLakeArtifactRepository {
    /// Connect to the account named in `artifact_uri` over REST.
    pub fn new(
        artifact_uri: &str,
        credential: Arc<dyn TokenCredential>,
        settings: &RepositorySettings,
    ) -> Result<Self> {
        let location = parse_abfss_uri(artifact_uri)?;
        let service =
            DataLakeRestService::new(&location.account_url(), credential, settings.timeout())?;
        Ok(Self::from_location(location, &service, settings))
    }

    /// Build on an already constructed service client.
    pub fn with_service(
        artifact_uri: &str,
        service: &dyn DataLakeService,
        settings: &RepositorySettings,
    ) -> Result<Self> {
        let location = parse_abfss_uri(artifact_uri)?;
        Ok(Self::from_location(location, service, settings))
    }

    fn from_location(
        location: ArtifactLocation,
        service: &dyn DataLakeService,
        settings: &RepositorySettings,
    ) -> Self {
        let fs = service.file_system(&location.filesystem);
        let timeout = settings.timeout();
        debug!(%location, ?timeout, "opened data lake artifact repository");
        Self {
            location,
            fs,
            timeout,
        }
    }

    pub fn location(&self) -> &ArtifactLocation {
        &self.location
    }

    /// Root directory all artifact paths are resolved against
    pub fn base_path(&self) -> &str {
        &self.location.base_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute Data Lake path for an optional repository-relative path
    pub fn resolve(&self, artifact_path: Option<&str>) -> String {
        path::join_optional(&self.location.base_path, artifact_path)
    }

    async fn timed<T, F>(&self, operation: F) -> std::result::Result<T, BackendError>
    where
        F: Future<Output = std::result::Result<T, BackendError>>,
    {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))?
    }

    /// Turn a raw one-level listing of `directory` into sorted entries
    /// relative to the base path.
    fn normalize_listing(&self, directory: &str, items: Vec<PathItem>) -> Vec<ArtifactEntry> {
        let base = self.base_path();
        let target = path::trim_trailing_slash(directory);

        let mut entries: Vec<ArtifactEntry> = items
            .into_iter()
            .filter(|item| path::trim_trailing_slash(&item.name) != target)
            .map(|item| {
                let relative = path::relative(&item.name, base);
                if item.is_directory {
                    ArtifactEntry::directory(relative)
                } else {
                    ArtifactEntry::file(relative, item.content_length.unwrap_or(0))
                }
            })
            .collect();

        // A file path lists as the file itself; a file has no children.
        let requested = path::strip_base(target, base);
        if let [only] = entries.as_slice() {
            if !only.is_dir && only.path == requested {
                return Vec::new();
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    async fn upload_file(
        &self,
        directory: &dyn DirectoryClient,
        relative: &str,
        local: &Path,
    ) -> Result<()> {
        let file = directory.file(relative);
        let size = tokio::fs::metadata(local).await?.len();
        if size == 0 {
            debug!(path = file.path(), "creating empty file");
            self.timed(file.create()).await?;
        } else {
            let reader = tokio::fs::File::open(local).await?;
            debug!(path = file.path(), size, "uploading file");
            self.timed(file.upload(Box::new(reader), size, true)).await?;
        }
        Ok(())
    }

    async fn stream_to_file(&self, remote_full_path: &str, local_path: &Path) -> Result<u64> {
        let (parent, name) = path::split(remote_full_path);
        let directory = self.fs.directory(parent);
        let file = directory.file(name);

        let mut local = tokio::fs::File::create(local_path).await?;
        let written = self.timed(file.download_to(&mut local)).await?;
        local.flush().await?;
        local.sync_all().await?;
        Ok(written)
    }
}

/// Local relative path rendered with `/` separators
fn posix_relative(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ArtifactRepository for DataLakeArtifactRepository {
    async fn log_artifact(&self, _local_file: &Path, _artifact_path: Option<&str>) -> Result<()> {
        Err(ArtifactError::UnsupportedOperation("logging single artifacts"))
    }

    async fn log_artifacts(&self, local_dir: &Path, artifact_path: Option<&str>) -> Result<()> {
        // A single file would otherwise land on the destination root itself.
        if !tokio::fs::metadata(local_dir).await?.is_dir() {
            return Err(ArtifactError::UnsupportedOperation("logging single artifacts"));
        }
        let dest_path = self.resolve(artifact_path);
        let directory = self.fs.directory(&dest_path);
        let local_dir = std::path::absolute(local_dir)?;

        let mut uploaded = 0usize;
        for entry in WalkDir::new(&local_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                ArtifactError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&local_dir)
                .map(posix_relative)
                .unwrap_or_else(|_| entry.file_name().to_string_lossy().into_owned());
            self.upload_file(directory.as_ref(), &relative, entry.path()).await?;
            uploaded += 1;
        }

        info!(destination = %dest_path, files = uploaded, "uploaded artifacts");
        Ok(())
    }

    async fn list_artifacts(&self, path: Option<&str>) -> Result<Vec<ArtifactEntry>> {
        let directory = self.resolve(path);
        debug!(directory = %directory, "listing artifacts");
        let items = self.timed(self.fs.list_paths(&directory, false)).await?;
        Ok(self.normalize_listing(&directory, items))
    }

    async fn download_file(&self, remote_path: &str, local_path: &Path) -> Result<()> {
        let remote_full_path = path::join(&self.location.base_path, remote_path);

        match self.stream_to_file(&remote_full_path, local_path).await {
            Ok(written) => {
                debug!(
                    remote = %remote_full_path,
                    local = %local_path.display(),
                    bytes = written,
                    "downloaded file"
                );
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(local_path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(
                            local = %local_path.display(),
                            "failed to remove partial download: {}",
                            cleanup
                        );
                    }
                }
                Err(ArtifactError::DownloadIncomplete {
                    path: remote_full_path,
                    source: Box::new(e),
                })
            }
        }
    }

    async fn delete_artifacts(&self, _artifact_path: Option<&str>) -> Result<()> {
        Err(ArtifactError::UnsupportedOperation("deleting artifacts"))
    }
}
