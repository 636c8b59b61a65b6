//! Repository settings

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timeout applied when no positive value is configured (10 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Prefix of the environment variables read by [`RepositorySettings::load`]
pub const ENV_PREFIX: &str = "ADLS_ARTIFACT";

/// Settings resolved once when a repository is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySettings {
    /// Upload/download timeout in seconds; zero or negative means "unset"
    #[serde(default)]
    pub upload_download_timeout: Option<i64>,
}

impl RepositorySettings {
    /// Settings with an explicit timeout in seconds
    pub fn with_timeout_secs(secs: i64) -> Self {
        Self {
            upload_download_timeout: Some(secs),
        }
    }

    /// Load from an optional settings file, then `ADLS_ARTIFACT_*`
    /// environment variables, later sources winning.
    ///
    /// `ADLS_ARTIFACT_UPLOAD_DOWNLOAD_TIMEOUT=900` sets a 15 minute timeout.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Effective timeout for every backend read/write
    pub fn timeout(&self) -> Duration {
        match self.upload_download_timeout {
            Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
            _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
