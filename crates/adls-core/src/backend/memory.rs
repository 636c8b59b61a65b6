//! In-memory Data Lake backend
//!
//! Emulates the hierarchical namespace: creating a file creates its parent
//! directories, listing a file path returns the file itself, and listing a
//! missing path fails with `NotFound`.

use crate::error::BackendError;
use crate::path;
use crate::ports::{DataLakeService, DirectoryClient, FileClient, FileSystemClient, UploadReader};
use adls_types::PathItem;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;

/// Listing behaviours some Data Lake endpoints exhibit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingQuirks {
    /// Report the listed directory as one of its own children
    pub self_entry: bool,
    /// Report directory names with a trailing `/`
    pub trailing_slash_dirs: bool,
    /// Report every name rooted with a leading `/`
    pub leading_slash_names: bool,
}

#[derive(Default)]
struct Tree {
    files: BTreeMap<String, Bytes>,
    dirs: BTreeSet<String>,
    failing_downloads: HashSet<String>,
}

impl Tree {
    fn write_file(
        &mut self,
        path: &str,
        data: Bytes,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        if path.is_empty() || self.dirs.contains(path) {
            return Err(conflict(path, "PathConflict"));
        }
        if !overwrite && self.files.contains_key(path) {
            return Err(conflict(path, "PathAlreadyExists"));
        }
        for (idx, _) in path.match_indices('/') {
            let parent = &path[..idx];
            if self.files.contains_key(parent) {
                return Err(conflict(parent, "PathConflict"));
            }
            self.dirs.insert(parent.to_string());
        }
        self.files.insert(path.to_string(), data);
        Ok(())
    }
}

fn conflict(path: &str, code: &str) -> BackendError {
    BackendError::Service {
        status: 409,
        message: format!("{code}: {path}"),
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

struct FsState {
    tree: RwLock<Tree>,
    quirks: ListingQuirks,
}

/// In-memory account holding any number of filesystems
#[derive(Clone, Default)]
pub struct InMemoryDataLake {
    filesystems: Arc<DashMap<String, Arc<FsState>>>,
    quirks: ListingQuirks,
}

impl InMemoryDataLake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply listing quirks to filesystems created from now on
    pub fn with_quirks(mut self, quirks: ListingQuirks) -> Self {
        self.quirks = quirks;
        self
    }

    fn state(&self, filesystem: &str) -> Arc<FsState> {
        self.filesystems
            .entry(filesystem.to_string())
            .or_insert_with(|| {
                Arc::new(FsState {
                    tree: RwLock::new(Tree::default()),
                    quirks: self.quirks,
                })
            })
            .clone()
    }

    /// Store a file directly, bypassing the client chain
    pub async fn put_file(
        &self,
        filesystem: &str,
        path: &str,
        data: impl Into<Bytes>,
    ) -> Result<(), BackendError> {
        let state = self.state(filesystem);
        let mut tree = state.tree.write().await;
        tree.write_file(&normalize(path), data.into(), true)
    }

    /// Create a directory and its parents
    pub async fn create_directory(&self, filesystem: &str, path: &str) {
        let state = self.state(filesystem);
        let mut tree = state.tree.write().await;
        let path = normalize(path);
        for (idx, _) in path.match_indices('/') {
            tree.dirs.insert(path[..idx].to_string());
        }
        if !path.is_empty() {
            tree.dirs.insert(path);
        }
    }

    /// Content of a stored file
    pub async fn read_file(&self, filesystem: &str, path: &str) -> Option<Bytes> {
        let state = self.state(filesystem);
        let tree = state.tree.read().await;
        tree.files.get(&normalize(path)).cloned()
    }

    /// Make downloads of `path` fail halfway through
    pub async fn fail_downloads(&self, filesystem: &str, path: &str) {
        let state = self.state(filesystem);
        state.tree.write().await.failing_downloads.insert(normalize(path));
    }
}

impl DataLakeService for InMemoryDataLake {
    fn file_system(&self, name: &str) -> Arc<dyn FileSystemClient> {
        Arc::new(MemoryFileSystem {
            state: self.state(name),
        })
    }
}

struct MemoryFileSystem {
    state: Arc<FsState>,
}

impl MemoryFileSystem {
    fn reported_name(&self, name: &str) -> String {
        if self.state.quirks.leading_slash_names {
            format!("/{name}")
        } else {
            name.to_string()
        }
    }

    fn file_item(&self, name: &str, data: &Bytes) -> PathItem {
        PathItem::file(self.reported_name(name), data.len() as u64)
    }

    fn dir_item(&self, name: &str) -> PathItem {
        let name = self.reported_name(name);
        if self.state.quirks.trailing_slash_dirs {
            PathItem::directory(format!("{name}/"))
        } else {
            PathItem::directory(name)
        }
    }
}

#[async_trait]
impl FileSystemClient for MemoryFileSystem {
    async fn list_paths(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<PathItem>, BackendError> {
        let path = normalize(path);
        let tree = self.state.tree.read().await;

        if let Some(data) = tree.files.get(&path) {
            return Ok(vec![self.file_item(&path, data)]);
        }
        if !path.is_empty() && !tree.dirs.contains(&path) {
            return Err(BackendError::NotFound(path));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };
        let in_scope = |name: &str| {
            name.strip_prefix(prefix.as_str())
                .map(|rest| !rest.is_empty() && (recursive || !rest.contains('/')))
                .unwrap_or(false)
        };

        let mut items = Vec::new();
        if self.state.quirks.self_entry && !path.is_empty() {
            items.push(self.dir_item(&path));
        }
        // Files first, then directories: callers must not rely on order.
        items.extend(
            tree.files
                .iter()
                .filter(|(name, _)| in_scope(name))
                .map(|(name, data)| self.file_item(name, data)),
        );
        items.extend(
            tree.dirs
                .iter()
                .filter(|name| in_scope(name))
                .map(|name| self.dir_item(name)),
        );
        Ok(items)
    }

    fn directory(&self, path: &str) -> Box<dyn DirectoryClient> {
        Box::new(MemoryDirectory {
            state: self.state.clone(),
            path: normalize(path),
        })
    }
}

struct MemoryDirectory {
    state: Arc<FsState>,
    path: String,
}

impl DirectoryClient for MemoryDirectory {
    fn path(&self) -> &str {
        &self.path
    }

    fn file(&self, relative_name: &str) -> Box<dyn FileClient> {
        Box::new(MemoryFile {
            state: self.state.clone(),
            path: normalize(&path::join(&self.path, relative_name)),
        })
    }
}

struct MemoryFile {
    state: Arc<FsState>,
    path: String,
}

#[async_trait]
impl FileClient for MemoryFile {
    fn path(&self) -> &str {
        &self.path
    }

    async fn create(&self) -> Result<(), BackendError> {
        let mut tree = self.state.tree.write().await;
        tree.write_file(&self.path, Bytes::new(), true)
    }

    async fn upload(
        &self,
        mut reader: UploadReader,
        length: u64,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        let mut data = Vec::with_capacity(length as usize);
        reader.read_to_end(&mut data).await?;
        if data.len() as u64 != length {
            return Err(BackendError::Service {
                status: 400,
                message: format!(
                    "InvalidFlushPosition: {} expected {} bytes, got {}",
                    self.path,
                    length,
                    data.len()
                ),
            });
        }

        let mut tree = self.state.tree.write().await;
        tree.write_file(&self.path, Bytes::from(data), overwrite)
    }

    async fn download_to(
        &self,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, BackendError> {
        let (data, failing) = {
            let tree = self.state.tree.read().await;
            let data = tree
                .files
                .get(&self.path)
                .cloned()
                .ok_or_else(|| BackendError::NotFound(self.path.clone()))?;
            (data, tree.failing_downloads.contains(&self.path))
        };

        if failing {
            sink.write_all(&data[..data.len() / 2]).await?;
            return Err(BackendError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                format!("connection reset while reading {}", self.path),
            )));
        }

        sink.write_all(&data).await?;
        Ok(data.len() as u64)
    }
}
