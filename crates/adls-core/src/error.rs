//! Error types for ADLS artifact repositories

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Errors raised by a Data Lake backend.
///
/// These reach callers untranslated, wrapped only in [`ArtifactError::Backend`].
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Storage service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Not an ABFSS URI: {0}")]
    InvalidUriScheme(String),

    #[error("ABFSS URI must be of the form abfss://<filesystem>@<account>.dfs.core.windows.net, got: {0}")]
    InvalidUriAuthority(String),

    #[error("This artifact repository does not support {0}")]
    UnsupportedOperation(&'static str),

    #[error("Download of {path} did not complete: {source}")]
    DownloadIncomplete {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Artifact path escapes the destination: {0}")]
    InvalidArtifactPath(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl ArtifactError {
    /// True for operations this repository never supports
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ArtifactError::UnsupportedOperation(_))
    }

    /// True when the backend reported a missing path
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtifactError::Backend(BackendError::NotFound(_)))
    }
}

impl From<config::ConfigError> for ArtifactError {
    fn from(e: config::ConfigError) -> Self {
        ArtifactError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArtifactError::UnsupportedOperation("deleting artifacts");
        assert_eq!(
            err.to_string(),
            "This artifact repository does not support deleting artifacts"
        );
        assert!(err.is_unsupported());

        let err = ArtifactError::from(BackendError::NotFound("fs/a".to_string()));
        assert_eq!(err.to_string(), "Path not found: fs/a");
        assert!(err.is_not_found());
        assert!(!err.is_unsupported());
    }

    #[test]
    fn test_download_incomplete_keeps_source() {
        use std::error::Error as _;

        let err = ArtifactError::DownloadIncomplete {
            path: "runs/model.bin".to_string(),
            source: Box::new(BackendError::Timeout(Duration::from_secs(5))),
        };
        assert!(err.to_string().contains("runs/model.bin"));
        assert!(err.source().is_some());
    }
}
