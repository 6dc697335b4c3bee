//! Interfaces to version control, package managers and the registry

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GitError, Result};
use crate::monorepo::Package;
use crate::session::ReleaseSession;
use crate::types::{ReleaseContext, ReleaseInfo};

static DESCRIBE_SHA_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\da-f]{7,40})(-dirty)?$").expect("Invalid regex"));

static DESCRIBE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:.*@)?(.*))-(\d+)-g([\da-f]+)(-dirty)?$").expect("Invalid regex")
});

/// Result of describing HEAD against the most recent reachable tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeResult {
    /// Most recent tag, `None` when no tag is reachable
    pub last_tag_name: Option<String>,
    /// Tag name without a `name@` prefix
    pub last_version: Option<String>,
    /// Commits between the tag (or the root) and HEAD
    pub ref_count: u64,
    /// Abbreviated HEAD sha
    pub sha: String,
    /// Working copy has uncommitted changes
    pub is_dirty: bool,
}

impl DescribeResult {
    /// Parse `describe --tags --always --long --dirty` output.
    ///
    /// When only a sha is printed, `count_commits` is asked for the number of
    /// commits reachable from it.
    pub fn parse<F>(output: &str, count_commits: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Result<u64>,
    {
        let output = output.trim();

        if let Some(caps) = DESCRIBE_SHA_ONLY.captures(output) {
            let sha = caps[1].to_string();
            let ref_count = count_commits(&sha)?;
            return Ok(Self {
                last_tag_name: None,
                last_version: None,
                ref_count,
                sha,
                is_dirty: caps.get(2).is_some(),
            });
        }

        let caps = DESCRIBE_TAG
            .captures(output)
            .ok_or_else(|| GitError::DescribeFailed(format!("unexpected output '{}'", output)))?;
        let ref_count = caps[3]
            .parse()
            .map_err(|_| GitError::DescribeFailed(format!("invalid commit count in '{}'", output)))?;

        Ok(Self {
            last_tag_name: Some(caps[1].to_string()),
            last_version: Some(caps[2].to_string()),
            ref_count,
            sha: caps[4].to_string(),
            is_dirty: caps.get(5).is_some(),
        })
    }
}

/// Version control queries used for change detection and release notes.
///
/// Pathspecs are absolute directories; `None` means the whole repository.
pub trait VersionControl {
    /// Whether any tag exists in the repository
    fn has_tags(&self) -> Result<bool>;

    /// Describe HEAD relative to the most recent tag on the first-parent history
    fn describe(&self) -> Result<DescribeResult>;

    /// Files differing between `committish` and the working tree
    fn diff_names(&self, committish: &str, pathspec: Option<&Path>) -> Result<Vec<String>>;

    /// Files touched by a single commit
    fn commit_diff_names(&self, hash: &str, pathspec: Option<&Path>) -> Result<Vec<String>>;

    /// Tracked files with uncommitted changes
    fn uncommitted_tracked_files(&self) -> Result<Vec<String>>;
}

/// Package manager lockfile maintenance
pub trait LockfileUpdater {
    /// Refresh the lockfile in `location`, a no-op when it has none
    fn update_lockfile(&self, location: &Path, npmrc: &Path, ctx: &ReleaseContext) -> Result<()>;

    /// Write `version` into the npm lockfiles of `location` when present
    fn sync_lock_version(&self, location: &Path, version: &str) -> Result<()>;
}

/// Registry credential setup and verification
pub trait RegistryAuth {
    /// Write credentials to the session npmrc and check them against the registry
    fn verify_auth(
        &self,
        session: &mut ReleaseSession,
        root: &Package,
        ctx: &ReleaseContext,
    ) -> Result<()>;
}

/// Publishes workspace packages whose version is not yet on the registry
pub trait Publisher {
    /// Publish every public package of `packages`
    fn publish_from_package(
        &self,
        root: &Package,
        packages: &[Package],
        npmrc: &Path,
        ctx: &ReleaseContext,
    ) -> Result<ReleaseInfo>;
}
