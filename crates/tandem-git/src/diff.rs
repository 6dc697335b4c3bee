//! Changed file listings

use std::path::Path;

use git2::{Diff, DiffOptions};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};

impl GitRepo {
    fn diff_options(&self, pathspec: Option<&Path>) -> DiffOptions {
        let mut opts = DiffOptions::new();
        if let Some(spec) = pathspec.and_then(|dir| self.pathspec(dir)) {
            opts.pathspec(spec);
        }
        opts
    }

    /// Files differing between `committish` and the working tree,
    /// like `git diff --name-only <committish> -- <pathspec>`
    #[instrument(skip(self), fields(pathspec = ?pathspec))]
    pub fn diff_names_since(&self, committish: &str, pathspec: Option<&Path>) -> Result<Vec<String>> {
        let tree = self.find_commit(committish)?.tree()?;
        let mut opts = self.diff_options(pathspec);
        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))?;

        let files = changed_paths(&diff);
        debug!(count = files.len(), "diffed against {}", committish);
        Ok(files)
    }

    /// Files touched by the commit `hash`, like `git diff --name-only <hash>^!`
    pub fn commit_changed_names(&self, hash: &str, pathspec: Option<&Path>) -> Result<Vec<String>> {
        let commit = self.find_commit(hash)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };

        let mut opts = self.diff_options(pathspec);
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        Ok(changed_paths(&diff))
    }
}

fn changed_paths(diff: &Diff<'_>) -> Vec<String> {
    let mut files: Vec<String> = diff
        .deltas()
        .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
        .map(|path| path.to_string_lossy().replace('\\', "/"))
        .collect();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{commit_all, tag, write};
    use git2::Repository;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(temp.path(), "packages/foo/index.js", "foo");
        write(temp.path(), "packages/foobar/index.js", "foobar");
        write(temp.path(), "packages/bar/index.js", "bar");
        commit_all(&repo, "chore: initial");
        tag(&repo, "v0.0.0");
        (temp, repo)
    }

    #[test]
    fn test_diff_scoped_to_package() {
        let (temp, repo) = setup();
        write(temp.path(), "packages/foo/index.js", "changed");
        write(temp.path(), "packages/foobar/index.js", "changed");
        commit_all(&repo, "feat: change foo");

        let git = GitRepo::open(temp.path()).unwrap();
        let foo = git
            .diff_names_since("v0.0.0", Some(&temp.path().join("packages/foo")))
            .unwrap();
        assert_eq!(foo, vec!["packages/foo/index.js"]);

        let bar = git
            .diff_names_since("v0.0.0", Some(&temp.path().join("packages/bar")))
            .unwrap();
        assert!(bar.is_empty());

        let all = git.diff_names_since("v0.0.0", None).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_diff_includes_uncommitted_changes() {
        let (temp, _repo) = setup();
        write(temp.path(), "packages/bar/index.js", "edited");

        let git = GitRepo::open(temp.path()).unwrap();
        let bar = git
            .diff_names_since("v0.0.0", Some(&temp.path().join("packages/bar")))
            .unwrap();
        assert_eq!(bar, vec!["packages/bar/index.js"]);
    }

    #[test]
    fn test_commit_changed_names() {
        let (temp, repo) = setup();
        write(temp.path(), "packages/bar/index.js", "changed");
        let oid = commit_all(&repo, "fix: bar");

        let git = GitRepo::open(temp.path()).unwrap();
        let hash = oid.to_string();
        assert_eq!(
            git.commit_changed_names(&hash, None).unwrap(),
            vec!["packages/bar/index.js"]
        );
        assert!(git
            .commit_changed_names(&hash, Some(&temp.path().join("packages/foo")))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unknown_revision() {
        let (temp, _repo) = setup();
        let git = GitRepo::open(temp.path()).unwrap();
        assert!(git.diff_names_since("v9.9.9", None).is_err());
    }
}
