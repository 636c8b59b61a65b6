//! Data Lake client ports
//!
//! Mirrors the service → filesystem → directory → file client chain of the
//! Data Lake SDKs. Handle lookups are local; only the async methods talk to
//! the service.

use crate::error::BackendError;
use adls_types::PathItem;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// Content source streamed into a file upload
pub type UploadReader = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Account-level client
pub trait DataLakeService: Send + Sync {
    /// Handle for one filesystem (container)
    fn file_system(&self, name: &str) -> Arc<dyn FileSystemClient>;
}

/// Filesystem-level client
#[async_trait]
pub trait FileSystemClient: Send + Sync {
    /// List entries under `path`. Names in the result are absolute within
    /// the filesystem. `recursive = false` lists one level only.
    async fn list_paths(&self, path: &str, recursive: bool)
        -> Result<Vec<PathItem>, BackendError>;

    /// Handle for the directory at `path`
    fn directory(&self, path: &str) -> Box<dyn DirectoryClient>;
}

/// Directory-level client
pub trait DirectoryClient: Send + Sync {
    /// Absolute path of this directory
    fn path(&self) -> &str;

    /// Handle for a file addressed relative to this directory
    fn file(&self, relative_name: &str) -> Box<dyn FileClient>;
}

/// File-level client
#[async_trait]
pub trait FileClient: Send + Sync {
    /// Absolute path of this file
    fn path(&self) -> &str;

    /// Create (or truncate to) an empty file
    async fn create(&self) -> Result<(), BackendError>;

    /// Stream `length` bytes from `reader` as the whole content of the file
    async fn upload(
        &self,
        reader: UploadReader,
        length: u64,
        overwrite: bool,
    ) -> Result<(), BackendError>;

    /// Stream the content into `sink`, returning the number of bytes written
    async fn download_to(
        &self,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, BackendError>;
}
