//! Posix path helpers for Data Lake paths
//!
//! Data Lake paths always use `/`, regardless of the host platform, so these
//! never go through `std::path`.

/// Join two path fragments the way `posixpath.join` does: an absolute
/// `tail` replaces `head`, an empty `head` yields `tail`.
pub fn join(head: &str, tail: &str) -> String {
    if tail.starts_with('/') || head.is_empty() {
        tail.to_string()
    } else if head.ends_with('/') {
        format!("{head}{tail}")
    } else {
        format!("{head}/{tail}")
    }
}

/// Join `tail` onto `head` only when it is present and non-empty
pub fn join_optional(head: &str, tail: Option<&str>) -> String {
    match tail {
        Some(tail) if !tail.is_empty() => join(head, tail),
        _ => head.to_string(),
    }
}

/// Split into `(parent, leaf)`; the parent keeps no trailing slash unless it
/// is the root itself.
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => {
            let head = &path[..=idx];
            let trimmed = head.trim_end_matches('/');
            let parent = if trimmed.is_empty() { head } else { trimmed };
            (parent, &path[idx + 1..])
        }
        None => ("", path),
    }
}

/// Path of `path` relative to `start`, both interpreted from the same root.
///
/// Empty and `.` segments are ignored, so trailing slashes never survive.
/// A path outside `start` climbs with `..`; identical paths give `.`.
pub fn relative(path: &str, start: &str) -> String {
    let path_parts = segments(path);
    let start_parts = segments(start);

    let common = path_parts
        .iter()
        .zip(start_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..")
        .take(start_parts.len() - common)
        .collect();
    parts.extend_from_slice(&path_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// `path` with the `base/` prefix removed, or `path` itself when `base` is
/// empty or not a prefix. Trailing slashes on `base` are ignored.
pub fn strip_base<'a>(path: &'a str, base: &str) -> &'a str {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return path;
    }
    path.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(if path == base { "" } else { path })
}

/// `path` without trailing slashes, keeping a lone `/`
pub fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && !path.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".").collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join("base", "a/b"), "base/a/b");
        assert_eq!(join("base/", "a"), "base/a");
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("base", "/abs"), "/abs");
        assert_eq!(join("base", ""), "base/");
    }

    #[test]
    fn test_join_optional() {
        assert_eq!(join_optional("base", None), "base");
        assert_eq!(join_optional("base", Some("")), "base");
        assert_eq!(join_optional("base", Some("x")), "base/x");
    }

    #[test]
    fn test_split() {
        assert_eq!(split("base/dir/file.txt"), ("base/dir", "file.txt"));
        assert_eq!(split("file.txt"), ("", "file.txt"));
        assert_eq!(split("/file.txt"), ("/", "file.txt"));
        assert_eq!(split("a//b"), ("a", "b"));
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative("base/a/b.txt", "base"), "a/b.txt");
        assert_eq!(relative("base/dir/", "base"), "dir");
        assert_eq!(relative("base", "base"), ".");
        assert_eq!(relative("other/x", "base/sub"), "../../other/x");
        assert_eq!(relative("a/b", ""), "a/b");
    }

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("base/a/b", "base"), "a/b");
        assert_eq!(strip_base("base", "base"), "");
        assert_eq!(strip_base("a/b", ""), "a/b");
        assert_eq!(strip_base("basement/x", "base"), "basement/x");
        assert_eq!(strip_base("base/run/x", "base/run/"), "x");
        assert_eq!(strip_base("base/run", "base/run/"), "");
    }

    #[test]
    fn test_trim_trailing_slash() {
        assert_eq!(trim_trailing_slash("a/b/"), "a/b");
        assert_eq!(trim_trailing_slash("a"), "a");
        assert_eq!(trim_trailing_slash("/"), "/");
        assert_eq!(trim_trailing_slash(""), "");
    }
}
