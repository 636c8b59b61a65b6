//! ADLS Core Library
//!
//! Artifact repository on top of Azure Data Lake Storage Gen2: URI
//! resolution, path translation, listing normalization, and the backend
//! ports the repository drives.

// Re-export pure types from adls-types
pub use adls_types::*;

pub mod backend;
pub mod config;
pub mod error;
pub mod path;
pub mod ports;
pub mod repository;
pub mod uri;

pub use backend::{DataLakeRestService, InMemoryDataLake};
pub use config::{RepositorySettings, DEFAULT_TIMEOUT_SECS};
pub use error::{ArtifactError, BackendError, Result};
pub use ports::{ArtifactRepository, StaticTokenCredential, TokenCredential};
pub use repository::DataLakeArtifactRepository;
pub use uri::parse_abfss_uri;
