//! Remote operations

use tandem_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Get the URL for a remote
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(|s| s.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(GitError::RemoteNotFound(name.to_string()))
            }
            Err(e) => Err(GitError::Git2(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;
    use tempfile::TempDir;

    #[test]
    fn test_remote_url() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        repo.remote("origin", "git@github.com:acme/widgets.git").unwrap();

        let git = GitRepo::open(temp.path()).unwrap();
        assert_eq!(
            git.remote_url("origin").unwrap().as_deref(),
            Some("git@github.com:acme/widgets.git")
        );
        assert!(matches!(
            git.remote_url("upstream"),
            Err(GitError::RemoteNotFound(_))
        ));
    }
}
