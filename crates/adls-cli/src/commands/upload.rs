//! Upload command - Upload a local directory

use super::RepositoryOptions;
use adls_core::ArtifactRepository;
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

pub async fn run(
    options: &RepositoryOptions,
    uri: &str,
    local_dir: &Path,
    artifact_path: Option<&str>,
) -> Result<()> {
    if !local_dir.is_dir() {
        bail!("Not a directory: {}", local_dir.display());
    }

    let repo = options.open(uri)?;
    repo.log_artifacts(local_dir, artifact_path).await?;

    println!(
        "{} {} -> {}",
        "Uploaded".green().bold(),
        local_dir.display(),
        repo.resolve(artifact_path)
    );
    Ok(())
}
