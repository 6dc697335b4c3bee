//! `VersionControl` backed by a git repository

use std::path::Path;

use tandem_core::collaborators::{DescribeResult, VersionControl};
use tandem_core::error::Result;

use crate::repository::GitRepo;

impl VersionControl for GitRepo {
    fn has_tags(&self) -> Result<bool> {
        Ok(GitRepo::has_tags(self)?)
    }

    fn describe(&self) -> Result<DescribeResult> {
        Ok(self.describe_head()?)
    }

    fn diff_names(&self, committish: &str, pathspec: Option<&Path>) -> Result<Vec<String>> {
        Ok(self.diff_names_since(committish, pathspec)?)
    }

    fn commit_diff_names(&self, hash: &str, pathspec: Option<&Path>) -> Result<Vec<String>> {
        Ok(self.commit_changed_names(hash, pathspec)?)
    }

    fn uncommitted_tracked_files(&self) -> Result<Vec<String>> {
        Ok(self.uncommitted_files()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{commit_all, tag, write};
    use git2::Repository;
    use tandem_core::monorepo::{load_packages, ChangeDetector, DependencyGraph, Latch, UpdateReason};
    use tempfile::TempDir;

    fn manifest(name: &str, deps: &str) -> String {
        format!(
            "{{\n  \"name\": \"{}\",\n  \"version\": \"1.0.0\",\n  \"dependencies\": {{{}}}\n}}\n",
            name, deps
        )
    }

    #[test]
    fn test_changed_packages_from_git() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let repo = Repository::init(root).unwrap();
        write(root, "package.json", "{\"name\": \"root\", \"version\": \"1.0.0\", \"workspaces\": [\"packages/*\"]}\n");
        write(root, "packages/core/package.json", &manifest("core", ""));
        write(root, "packages/cli/package.json", &manifest("cli", "\"core\": \"^1.0.0\""));
        write(root, "packages/docs/package.json", &manifest("docs", ""));
        write(root, "packages/docs/README.md", "docs");
        commit_all(&repo, "chore: initial");
        tag(&repo, "v1.0.0");

        write(root, "packages/core/index.js", "export default 1;");
        write(root, "packages/docs/README.md", "more docs");
        commit_all(&repo, "feat: core entry");

        let git = GitRepo::open(root).unwrap();
        let graph = DependencyGraph::build(&load_packages(root).unwrap()).unwrap();
        let updates = ChangeDetector::new(&git, root)
            .with_ignore_changes(&["*.md".to_string()])
            .unwrap()
            .collect_updates(&graph, "1.0.1", Latch::Minor)
            .unwrap();

        assert_eq!(updates.reason, UpdateReason::ChangedSince("v1.0.0".to_string()));
        assert_eq!(updates.packages, vec!["cli", "core"]);
    }
}
