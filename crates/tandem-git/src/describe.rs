//! Describe HEAD against the most recent tag

use git2::{DescribeFormatOptions, DescribeOptions};
use tracing::{debug, instrument};

use tandem_core::collaborators::DescribeResult;
use tandem_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Equivalent of `git describe --tags --always --long --dirty --first-parent`
    pub fn describe_output(&self) -> Result<String> {
        let mut opts = DescribeOptions::new();
        opts.describe_tags()
            .show_commit_oid_as_fallback(true)
            .only_follow_first_parent(true);

        let mut format = DescribeFormatOptions::new();
        format.always_use_long_format(true).dirty_suffix("-dirty");

        let describe = self.repo.describe(&opts)?;
        Ok(describe.format(Some(&format))?)
    }

    /// Describe HEAD, counting commits from the root when no tag is reachable
    #[instrument(skip(self))]
    pub fn describe_head(&self) -> Result<DescribeResult> {
        let output = self.describe_output()?;
        debug!(output = %output, "described HEAD");

        DescribeResult::parse(&output, |sha| Ok(self.count_commits(sha)?)).map_err(|e| {
            GitError::DescribeFailed(e.to_string())
        })
    }

    /// Number of commits reachable from `rev`
    pub fn count_commits(&self, rev: &str) -> Result<u64> {
        let commit = self.find_commit(rev)?;
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(commit.id())?;
        Ok(revwalk.count() as u64)
    }
}
