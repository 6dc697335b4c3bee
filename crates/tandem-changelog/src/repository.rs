//! Repository URL parsing for release notes links

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use tandem_core::error::{ChangelogError, Result};

/// `user@host:path` shorthand used by ssh remotes
static SCP_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?P<auth>.*)@)?(?P<host>.*?):(?P<path>.*)$").expect("Invalid regex"));

static DOT_GIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.git$").expect("Invalid regex"));

/// Parts of a repository URL used to build links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUrl {
    /// Web base URL, e.g. `https://github.com`
    pub host: String,
    pub hostname: String,
    pub owner: Option<String>,
    pub repository: Option<String>,
}

impl RepositoryUrl {
    /// Parse an https, ssh or scp-like repository URL
    pub fn parse(repository_url: &str) -> Result<Self> {
        let invalid = || ChangelogError::InvalidRepositoryUrl(repository_url.to_string());
        let trimmed = DOT_GIT.replace(repository_url.trim(), "");

        let normalized = match SCP_LIKE.captures(&trimmed) {
            Some(caps) if !trimmed.contains("://") => {
                let auth = caps
                    .name("auth")
                    .map(|m| format!("{}@", m.as_str()))
                    .unwrap_or_default();
                format!("ssh://{}{}/{}", auth, &caps["host"], &caps["path"])
            }
            _ => trimmed.to_string(),
        };

        let url = Url::parse(&normalized).map_err(|_| invalid())?;
        let hostname = url.host_str().ok_or_else(invalid)?.to_string();

        let protocol = if url.scheme() == "http" { "http" } else { "https" };
        let port = match url.port() {
            Some(port) if !url.scheme().contains("ssh") => format!(":{}", port),
            _ => String::new(),
        };

        let mut segments = url.path().trim_start_matches('/').splitn(2, '/');
        let owner = segments.next().filter(|s| !s.is_empty()).map(str::to_string);
        let repository = segments
            .next()
            .map(|s| s.trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            host: format!("{}://{}{}", protocol, hostname, port),
            hostname,
            owner,
            repository,
        })
    }

    /// `host/owner/repository`
    pub fn base(&self) -> String {
        let mut base = self.host.clone();
        for part in [&self.owner, &self.repository].into_iter().flatten() {
            base.push('/');
            base.push_str(part);
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_url() {
        let repo = RepositoryUrl::parse("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(repo.host, "https://github.com");
        assert_eq!(repo.owner.as_deref(), Some("acme"));
        assert_eq!(repo.repository.as_deref(), Some("widgets"));
        assert_eq!(repo.base(), "https://github.com/acme/widgets");
    }

    #[test]
    fn test_scp_like_url() {
        let repo = RepositoryUrl::parse("git@gitlab.com:group/sub/project.git").unwrap();
        assert_eq!(repo.host, "https://gitlab.com");
        assert_eq!(repo.hostname, "gitlab.com");
        assert_eq!(repo.owner.as_deref(), Some("group"));
        assert_eq!(repo.repository.as_deref(), Some("sub/project"));
    }

    #[test]
    fn test_ssh_port_dropped() {
        let repo = RepositoryUrl::parse("ssh://git@git.example.com:2222/team/app.git").unwrap();
        assert_eq!(repo.host, "https://git.example.com");
    }

    #[test]
    fn test_http_port_kept() {
        let repo = RepositoryUrl::parse("http://git.local:8080/team/app").unwrap();
        assert_eq!(repo.host, "http://git.local:8080");
    }

    #[test]
    fn test_invalid_url() {
        assert!(RepositoryUrl::parse("not a url").is_err());
    }
}
