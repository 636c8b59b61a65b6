//! Log command - Upload a single local file

use super::RepositoryOptions;
use adls_core::ArtifactRepository;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub async fn run(
    options: &RepositoryOptions,
    uri: &str,
    local_file: &Path,
    artifact_path: Option<&str>,
) -> Result<()> {
    let repo = options.open(uri)?;
    repo.log_artifact(local_file, artifact_path).await?;

    println!(
        "{} {} -> {}",
        "Uploaded".green().bold(),
        local_file.display(),
        repo.resolve(artifact_path)
    );
    Ok(())
}
