//! `abfss://` URI resolution

use crate::error::{ArtifactError, Result};
use adls_types::ArtifactLocation;
use once_cell::sync::Lazy;
use regex::Regex;

/// The only scheme accepted: TLS-secured ABFS
pub const ABFSS_SCHEME: &str = "abfss";

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):(.*)$").expect("valid scheme regex"));

static AUTHORITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^@]+)@([^.]+)\.dfs\.core\.windows\.net(?::\d+)?$")
        .expect("valid authority regex")
});

/// Parse an URI of the form
/// `abfss://<filesystem>@<account>.dfs.core.windows.net/<path>`.
///
/// The path is returned verbatim apart from one leading slash: no `..`
/// folding and no percent-decoding. Query and fragment are ignored.
pub fn parse_abfss_uri(uri: &str) -> Result<ArtifactLocation> {
    let (scheme, rest) = SCHEME_RE
        .captures(uri)
        .map(|c| (c[1].to_ascii_lowercase(), c.get(2).map_or("", |m| m.as_str())))
        .unwrap_or_default();
    if scheme != ABFSS_SCHEME {
        return Err(ArtifactError::InvalidUriScheme(uri.to_string()));
    }

    let (authority, path) = match rest.strip_prefix("//") {
        Some(hier) => {
            let end = hier.find(['/', '?', '#']).unwrap_or(hier.len());
            let path_end = hier.find(['?', '#']).unwrap_or(hier.len()).max(end);
            (&hier[..end], &hier[end..path_end])
        }
        None => ("", rest),
    };

    let caps = AUTHORITY_RE
        .captures(authority)
        .ok_or_else(|| ArtifactError::InvalidUriAuthority(uri.to_string()))?;
    let path = path.strip_prefix('/').unwrap_or(path);

    Ok(ArtifactLocation {
        filesystem: caps[1].to_string(),
        account: caps[2].to_string(),
        base_path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uri() {
        let location = parse_abfss_uri("abfss://fsA@acct1.dfs.core.windows.net/root/sub").unwrap();
        assert_eq!(location.filesystem, "fsA");
        assert_eq!(location.account, "acct1");
        assert_eq!(location.base_path, "root/sub");
    }

    #[test]
    fn test_parse_without_path() {
        let location = parse_abfss_uri("abfss://fs@acct.dfs.core.windows.net").unwrap();
        assert_eq!(location.base_path, "");

        let location = parse_abfss_uri("abfss://fs@acct.dfs.core.windows.net/").unwrap();
        assert_eq!(location.base_path, "");
    }

    #[test]
    fn test_parse_keeps_path_verbatim() {
        let location =
            parse_abfss_uri("abfss://fs@acct.dfs.core.windows.net/a/../b%20c/").unwrap();
        assert_eq!(location.base_path, "a/../b%20c/");

        let location = parse_abfss_uri("abfss://fs@acct.dfs.core.windows.net//double").unwrap();
        assert_eq!(location.base_path, "/double");
    }

    #[test]
    fn test_parse_drops_query_and_fragment() {
        let location =
            parse_abfss_uri("abfss://fs@acct.dfs.core.windows.net/runs/1?sv=2021#frag").unwrap();
        assert_eq!(location.base_path, "runs/1");
    }

    #[test]
    fn test_parse_accepts_port_and_uppercase_scheme() {
        let location = parse_abfss_uri("ABFSS://fs@acct.dfs.core.windows.net:443/p").unwrap();
        assert_eq!(location.account, "acct");
        assert_eq!(location.base_path, "p");
    }

    #[test]
    fn test_rejects_other_schemes() {
        for uri in [
            "abfs://fs@acct.dfs.core.windows.net/p",
            "wasbs://fs@acct.blob.core.windows.net/p",
            "s3://bucket/p",
            "/local/path",
            "",
        ] {
            let err = parse_abfss_uri(uri).unwrap_err();
            assert!(
                matches!(err, ArtifactError::InvalidUriScheme(_)),
                "{uri}: {err}"
            );
        }
    }

    #[test]
    fn test_rejects_bad_authority() {
        for uri in [
            "abfss://acct.dfs.core.windows.net/p",
            "abfss://@acct.dfs.core.windows.net/p",
            "abfss://fs@acct.blob.core.windows.net/p",
            "abfss://fs@.dfs.core.windows.net/p",
            "abfss://fs@acct.dfs.core.windows.net.evil.com/p",
            "abfss:fs@acct.dfs.core.windows.net/p",
        ] {
            let err = parse_abfss_uri(uri).unwrap_err();
            assert!(
                matches!(err, ArtifactError::InvalidUriAuthority(_)),
                "{uri}: {err}"
            );
        }
    }

    #[test]
    fn test_round_trip_through_location() {
        let location = ArtifactLocation::new("data", "store", "experiments/7");
        assert_eq!(parse_abfss_uri(&location.to_uri()).unwrap(), location);
    }
}
