//! Delete command - Remove artifacts under a path

use super::RepositoryOptions;
use adls_core::ArtifactRepository;
use anyhow::Result;
use colored::Colorize;

pub async fn run(options: &RepositoryOptions, uri: &str, path: Option<&str>) -> Result<()> {
    let repo = options.open(uri)?;
    repo.delete_artifacts(path).await?;

    println!("{} {}", "Deleted".green().bold(), repo.resolve(path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adls_core::ArtifactError;

    #[tokio::test]
    async fn test_delete_is_unsupported() {
        let options = RepositoryOptions {
            token: Some("token".to_string()),
            config: None,
            timeout: None,
        };

        let err = run(&options, "abfss://fs@acct.dfs.core.windows.net/runs", Some("old"))
            .await
            .unwrap_err();
        let err = err.downcast_ref::<ArtifactError>().unwrap();
        assert!(err.is_unsupported(), "{err}");
        assert!(err.to_string().contains("deleting artifacts"));
    }
}
