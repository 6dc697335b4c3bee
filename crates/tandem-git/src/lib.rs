//! Tandem Git - git queries for release automation
//!
//! This crate answers the version control questions asked during a release:
//! the last reachable tag, files changed since it, the commits in between
//! and whether the working copy is clean.

mod commits;
mod describe;
mod diff;
mod remote;
mod repository;
mod status;
mod tags;
mod vcs;

pub use repository::{GitRepo, Result};
pub use tandem_core::types::CommitInfo;

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use git2::{Repository, Signature};

    /// Stage every file under `root` and commit it on HEAD
    pub(crate) fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Write `content` to `path` relative to the repository root
    pub(crate) fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Tag HEAD with a lightweight tag
    pub(crate) fn tag(repo: &Repository, name: &str) {
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.tag_lightweight(name, head.as_object(), false).unwrap();
    }
}
