//! Artifact listing types

use serde::{Deserialize, Serialize};

/// One listed artifact, addressed relative to the repository root.
///
/// `file_size` is set for files and absent for directories; the two
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub path: String,
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl ArtifactEntry {
    /// A file entry with its content length
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            file_size: Some(size),
        }
    }

    /// A directory entry; any trailing slash is dropped
    pub fn directory(path: impl Into<String>) -> Self {
        let mut path = path.into();
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        Self {
            path,
            is_dir: true,
            file_size: None,
        }
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Raw entry as reported by a Data Lake `list_paths` call.
///
/// `name` is absolute within the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    pub name: String,
    pub is_directory: bool,
    pub content_length: Option<u64>,
}

impl PathItem {
    pub fn file(name: impl Into<String>, content_length: u64) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
            content_length: Some(content_length),
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            content_length: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_drops_trailing_slash() {
        let entry = ArtifactEntry::directory("models/v1/");
        assert_eq!(entry.path, "models/v1");
        assert!(entry.is_dir);
        assert_eq!(entry.file_size, None);
    }

    #[test]
    fn test_file_has_size() {
        let entry = ArtifactEntry::file("models/weights.bin", 42);
        assert!(!entry.is_dir);
        assert_eq!(entry.file_size, Some(42));
        assert_eq!(entry.name(), "weights.bin");
    }

    #[test]
    fn test_directory_json_omits_size() {
        let json = serde_json::to_value(ArtifactEntry::directory("plots")).unwrap();
        assert_eq!(json, serde_json::json!({ "path": "plots", "is_dir": true }));

        let json = serde_json::to_value(ArtifactEntry::file("a.txt", 3)).unwrap();
        assert_eq!(json["file_size"], 3);
    }
}
