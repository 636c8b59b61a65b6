//! List command - List artifacts

use super::RepositoryOptions;
use adls_core::{ArtifactEntry, ArtifactRepository};
use anyhow::Result;
use colored::Colorize;

pub async fn run(
    options: &RepositoryOptions,
    uri: &str,
    path: Option<&str>,
    json: bool,
) -> Result<()> {
    let repo = options.open(uri)?;
    let entries = repo.list_artifacts(path).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No artifacts".dimmed());
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &ArtifactEntry) -> String {
    match entry.file_size {
        Some(size) => format!("{:>12}  {}", size, entry.path),
        None => format!("{:>12}  {}", "<dir>".dimmed(), format!("{}/", entry.path).blue()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_entry() {
        let line = format_entry(&ArtifactEntry::file("model.bin", 2048));
        assert_eq!(line, "        2048  model.bin");
    }

    #[test]
    fn test_format_directory_entry() {
        colored::control::set_override(false);
        let line = format_entry(&ArtifactEntry::directory("plots"));
        assert_eq!(line, "       <dir>  plots/");
    }
}
