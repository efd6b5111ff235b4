//! Repository reference parsing.
//!
//! Module registrations commonly paste a forge "browse" URL rather than a
//! clone URL: `https://host/owner/repo/tree/<branch>/<path...>`. We split
//! such references into the clonable base URL, the branch, and the path
//! inside the repository. Anything without a `/tree/` segment passes
//! through as a plain clone URL.

/// Parsed repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Clonable URL (or local path).
    pub url: String,
    /// Branch encoded in a browse URL, if any.
    pub branch: Option<String>,
    /// Path inside the repository encoded in a browse URL, if any.
    pub path: Option<String>,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('/');

        if let Some((base, rest)) = raw.split_once("/tree/") {
            let mut segments = rest.splitn(2, '/');
            let branch = segments.next().filter(|s| !s.is_empty());
            let path = segments.next().filter(|s| !s.is_empty());
            return Self {
                url: base.to_string(),
                branch: branch.map(String::from),
                path: path.map(String::from),
            };
        }

        Self {
            url: raw.to_string(),
            branch: None,
            path: None,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_clone_url_passes_through() {
        let r = RepoRef::parse("https://github.com/acme/monitor-modules.git");
        assert_eq!(r.url, "https://github.com/acme/monitor-modules.git");
        assert!(r.branch.is_none());
        assert!(r.path.is_none());
    }

    #[test]
    fn test_browse_url_with_branch_and_path() {
        let r = RepoRef::parse("https://github.com/acme/monitor-modules/tree/main/probes/http");
        assert_eq!(r.url, "https://github.com/acme/monitor-modules");
        assert_eq!(r.branch.as_deref(), Some("main"));
        assert_eq!(r.path.as_deref(), Some("probes/http"));
    }

    #[test]
    fn test_browse_url_branch_only() {
        let r = RepoRef::parse("https://github.com/acme/monitor-modules/tree/develop");
        assert_eq!(r.url, "https://github.com/acme/monitor-modules");
        assert_eq!(r.branch.as_deref(), Some("develop"));
        assert!(r.path.is_none());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let r = RepoRef::parse("https://github.com/acme/mods/tree/main/probes/");
        assert_eq!(r.branch.as_deref(), Some("main"));
        assert_eq!(r.path.as_deref(), Some("probes"));
    }

    #[test]
    fn test_local_path_passes_through() {
        let r = RepoRef::parse("/srv/git/modules");
        assert_eq!(r.url, "/srv/git/modules");
        assert!(r.branch.is_none());
    }
}
