//! CLI command implementations

pub mod delete;
pub mod download;
pub mod list;
pub mod log;
pub mod parse;
pub mod upload;

use adls_core::{DataLakeArtifactRepository, RepositorySettings, StaticTokenCredential};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Options shared by every command that talks to the storage account
pub struct RepositoryOptions {
    pub token: Option<String>,
    pub config: Option<PathBuf>,
    pub timeout: Option<i64>,
}

impl RepositoryOptions {
    /// Settings from the optional file and environment, with the
    /// `--timeout` flag taking precedence
    pub fn settings(&self) -> Result<RepositorySettings> {
        let mut settings = RepositorySettings::load(self.config.as_deref())
            .context("Failed to load repository settings")?;
        if let Some(timeout) = self.timeout {
            settings.upload_download_timeout = Some(timeout);
        }
        Ok(settings)
    }

    pub fn open(&self, uri: &str) -> Result<DataLakeArtifactRepository> {
        let token = self
            .token
            .clone()
            .context("No storage token: pass --token or set AZURE_STORAGE_TOKEN")?;
        let settings = self.settings()?;
        let repo = DataLakeArtifactRepository::new(
            uri,
            Arc::new(StaticTokenCredential::new(token)),
            &settings,
        )?;
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_timeout_flag_overrides_settings_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "upload_download_timeout = 120")?;

        let options = RepositoryOptions {
            token: None,
            config: Some(file.path().to_path_buf()),
            timeout: Some(30),
        };
        assert_eq!(options.settings()?.timeout().as_secs(), 30);
        Ok(())
    }

    #[test]
    fn test_open_requires_token() {
        let options = RepositoryOptions {
            token: None,
            config: None,
            timeout: None,
        };
        let err = options
            .open("abfss://fs@acct.dfs.core.windows.net/runs")
            .err()
            .unwrap();
        assert!(err.to_string().contains("AZURE_STORAGE_TOKEN"));
    }

    #[test]
    fn test_open_rejects_bad_uri() {
        let options = RepositoryOptions {
            token: Some("token".to_string()),
            config: None,
            timeout: None,
        };
        let err = options.open("s3://bucket/runs").err().unwrap();
        assert!(err.to_string().contains("Not an ABFSS URI"));
    }
}
