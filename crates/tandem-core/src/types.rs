//! Release context types shared by the lifecycle hooks

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about a git commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub hash: String,
    /// Short hash (first 7 characters)
    pub short_hash: String,
    /// Commit message (first line)
    pub message: String,
    /// Full commit message body
    pub body: Option<String>,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Create a new CommitInfo
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let hash = hash.into();
        let short_hash = hash.chars().take(7).collect();

        Self {
            hash,
            short_hash,
            message: message.into(),
            body: None,
            author: author.into(),
            author_email: author_email.into(),
            timestamp,
        }
    }

    /// Set the commit body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = (!body.trim().is_empty()).then_some(body);
        self
    }

    /// Get the full message including body
    pub fn full_message(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}", self.message, body),
            None => self.message.clone(),
        }
    }
}

/// The previous release
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastRelease {
    pub version: Option<String>,
    pub git_tag: Option<String>,
    pub git_head: Option<String>,
}

/// The release being made
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextRelease {
    pub version: String,
    pub channel: Option<String>,
    pub git_tag: Option<String>,
    pub git_head: Option<String>,
}

/// Options of the surrounding release run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOptions {
    pub repository_url: Option<String>,
}

/// Everything the lifecycle hooks know about the current run
#[derive(Debug, Clone, Default)]
pub struct ReleaseContext {
    /// Working directory of the run
    pub cwd: PathBuf,
    /// Environment passed to subprocesses
    pub env: BTreeMap<String, String>,
    /// Commits included in the release
    pub commits: Vec<CommitInfo>,
    pub last_release: LastRelease,
    pub next_release: NextRelease,
    pub options: ReleaseOptions,
}

impl ReleaseContext {
    /// Create a context for `cwd` releasing `version`
    pub fn new(cwd: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            next_release: NextRelease {
                version: version.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Use the current process environment
    pub fn with_process_env(mut self) -> Self {
        self.env = std::env::vars().collect();
        self
    }

    /// Look up an environment variable of the run
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Where a release was published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Human readable release name
    pub name: String,
    /// Link to the published release
    pub url: Option<String>,
    /// Release channel
    pub channel: Option<String>,
}
