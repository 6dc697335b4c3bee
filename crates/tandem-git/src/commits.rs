//! Commit history operations

use chrono::{TimeZone, Utc};
use git2::Sort;

use crate::repository::{GitRepo, Result};
use tandem_core::types::CommitInfo;

impl GitRepo {
    /// Commits reachable from HEAD but not from `since`, newest first.
    ///
    /// With `since` unset every commit of HEAD is returned.
    pub fn commits_since(&self, since: Option<&str>) -> Result<Vec<CommitInfo>> {
        let head = self.head_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head.id())?;
        if let Some(since) = since {
            revwalk.hide(self.find_commit(since)?.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(commit_to_info(&commit));
        }

        Ok(commits)
    }

    /// Full hash of HEAD
    pub fn head_hash(&self) -> Result<String> {
        Ok(self.head_commit()?.id().to_string())
    }
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let author = commit.author();
    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        commit.id().to_string(),
        commit.summary().unwrap_or("(no message)"),
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or("unknown@example.com"),
        timestamp,
    )
    .with_body(commit.body().unwrap_or_default())
}
