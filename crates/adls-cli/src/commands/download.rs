//! Download command - Download a file or directory tree

use super::RepositoryOptions;
use adls_core::ArtifactRepository;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub async fn run(options: &RepositoryOptions, uri: &str, path: &str, dst: &Path) -> Result<()> {
    let repo = options.open(uri)?;
    tokio::fs::create_dir_all(dst)
        .await
        .with_context(|| format!("Failed to create {}", dst.display()))?;

    let local = repo.download_artifacts(path, dst).await?;
    println!("{} {}", "Downloaded to".green().bold(), local.display());
    Ok(())
}
