//! Artifact location types

use serde::{Deserialize, Serialize};

/// DNS suffix shared by every ADLS Gen2 account endpoint
pub const DFS_DOMAIN_SUFFIX: &str = "dfs.core.windows.net";

/// Where a repository's artifacts live inside a Data Lake account.
///
/// Derived once from an `abfss://` URI and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactLocation {
    /// ADLS filesystem (container) name
    pub filesystem: String,
    /// Storage account name
    pub account: String,
    /// Root directory of the repository.
    ///
    /// Exactly one leading slash is removed, so `//double` is kept as
    /// `/double`. Trailing slashes are kept as given.
    pub base_path: String,
}

impl ArtifactLocation {
    pub fn new(
        filesystem: impl Into<String>,
        account: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        let base_path = base_path.into();
        let base_path = base_path.strip_prefix('/').map(str::to_string).unwrap_or(base_path);
        Self {
            filesystem: filesystem.into(),
            account: account.into(),
            base_path,
        }
    }

    /// HTTPS endpoint of the account's DFS service
    pub fn account_url(&self) -> String {
        format!("https://{}.{}", self.account, DFS_DOMAIN_SUFFIX)
    }

    /// Render back to the canonical `abfss://` form
    pub fn to_uri(&self) -> String {
        format!(
            "abfss://{}@{}.{}/{}",
            self.filesystem, self.account, DFS_DOMAIN_SUFFIX, self.base_path
        )
    }
}

impl std::fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_url() {
        let location = ArtifactLocation::new("fs", "acct", "runs/1");
        assert_eq!(location.account_url(), "https://acct.dfs.core.windows.net");
    }

    #[test]
    fn test_new_strips_single_leading_slash() {
        let location = ArtifactLocation::new("fs", "acct", "/runs/1");
        assert_eq!(location.base_path, "runs/1");

        let location = ArtifactLocation::new("fs", "acct", "//runs");
        assert_eq!(location.base_path, "/runs");
    }

    #[test]
    fn test_display_is_uri() {
        let location = ArtifactLocation::new("fs", "acct", "a/b");
        assert_eq!(location.to_string(), "abfss://fs@acct.dfs.core.windows.net/a/b");
    }
}
