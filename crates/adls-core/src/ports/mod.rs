//! Port traits (interfaces) for dependency injection

pub mod credential;
pub mod datalake;
pub mod repository;

pub use credential::{StaticTokenCredential, TokenCredential};
pub use datalake::{DataLakeService, DirectoryClient, FileClient, FileSystemClient, UploadReader};
pub use repository::ArtifactRepository;
