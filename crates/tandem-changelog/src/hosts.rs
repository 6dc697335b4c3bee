//! Link conventions of known repository hosts

/// Path segments and reference keywords of a repository host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Host name, `None` for the fallback entry
    pub hostname: Option<&'static str>,
    /// Issue path segment
    pub issue: &'static str,
    /// Commit path segment
    pub commit: &'static str,
    pub reference_actions: &'static [&'static str],
    pub issue_prefixes: &'static [&'static str],
}

impl HostConfig {
    pub fn reference_actions(&self) -> Vec<String> {
        self.reference_actions.iter().map(|a| a.to_string()).collect()
    }

    pub fn issue_prefixes(&self) -> Vec<String> {
        self.issue_prefixes.iter().map(|p| p.to_string()).collect()
    }
}

const CLOSING_ACTIONS: &[&str] = &[
    "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

const CLOSING_ACTIONS_PROGRESSIVE: &[&str] = &[
    "close", "closes", "closed", "closing", "fix", "fixes", "fixed", "fixing", "resolve",
    "resolves", "resolved", "resolving",
];

const GITLAB_ACTIONS: &[&str] = &[
    "close", "closes", "closed", "closing", "fix", "fixes", "fixed", "fixing", "resolve",
    "resolves", "resolved", "resolving", "implement", "implements", "implemented",
    "implementing",
];

/// Known hosts
pub const HOSTS: &[HostConfig] = &[
    HostConfig {
        hostname: Some("github.com"),
        issue: "issues",
        commit: "commit",
        reference_actions: CLOSING_ACTIONS,
        issue_prefixes: &["#", "gh-"],
    },
    HostConfig {
        hostname: Some("bitbucket.org"),
        issue: "issue",
        commit: "commits",
        reference_actions: CLOSING_ACTIONS_PROGRESSIVE,
        issue_prefixes: &["#"],
    },
    HostConfig {
        hostname: Some("gitlab.com"),
        issue: "issues",
        commit: "commit",
        reference_actions: GITLAB_ACTIONS,
        issue_prefixes: &["#"],
    },
];

/// Used for hosts not listed in [`HOSTS`]
pub const DEFAULT_HOST: HostConfig = HostConfig {
    hostname: None,
    issue: "issues",
    commit: "commit",
    reference_actions: CLOSING_ACTIONS,
    issue_prefixes: &["#"],
};

/// Conventions for `hostname`
pub fn host_config(hostname: &str) -> &'static HostConfig {
    HOSTS
        .iter()
        .find(|h| h.hostname == Some(hostname))
        .unwrap_or(&DEFAULT_HOST)
}
