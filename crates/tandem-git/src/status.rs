//! Repository status operations

use git2::{Status, StatusOptions};

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Tracked files with staged or unstaged changes, untracked files excluded
    pub fn uncommitted_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let dirty = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE
            | Status::WT_MODIFIED
            | Status::WT_DELETED
            | Status::WT_RENAMED
            | Status::WT_TYPECHANGE;

        Ok(statuses
            .iter()
            .filter(|entry| entry.status().intersects(dirty))
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    /// Check if the working directory has no uncommitted tracked changes
    pub fn is_clean(&self) -> Result<bool> {
        Ok(self.uncommitted_files()?.is_empty())
    }

    /// Get the current branch name, `None` when HEAD is detached or unborn
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            Ok(None)
        }
    }
}
