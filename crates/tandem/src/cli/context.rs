//! Release context assembled from the repository and command line

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use tracing::debug;

use tandem_adapters::{NpmAuth, NpmLockfiles, NpmPublisher};
use tandem_core::config::{load_config, load_config_or_default, PluginConfig};
use tandem_core::types::{LastRelease, NextRelease, ReleaseContext, ReleaseOptions};
use tandem_core::workflow::Collaborators;
use tandem_git::GitRepo;

use crate::cli::Cli;

/// Release options shared by the release commands
#[derive(Debug, Clone, Args)]
pub struct ReleaseArgs {
    /// Version being released
    #[arg(long = "next-version", value_name = "VERSION")]
    pub next_version: String,

    /// Release channel (dist-tag)
    #[arg(long)]
    pub channel: Option<String>,

    /// Tag of the previous release, detected from the history by default
    #[arg(long, value_name = "TAG")]
    pub last_tag: Option<String>,

    /// Repository URL for release notes links, the `origin` remote by default
    #[arg(long, value_name = "URL")]
    pub repository_url: Option<String>,
}

/// Everything a command needs to run the lifecycle hooks
pub struct Run {
    pub config: PluginConfig,
    pub ctx: ReleaseContext,
    pub repo: GitRepo,
    lockfiles: NpmLockfiles,
    auth: NpmAuth,
    publisher: NpmPublisher,
}

impl Run {
    /// Load configuration and build the release context for `args`
    pub fn load(cli: &Cli, args: &ReleaseArgs) -> anyhow::Result<Self> {
        let mut run = Self::open(cli)?;
        run.ctx = build_context(&run.repo, run.ctx.cwd.clone(), args)?;
        debug!(
            last_tag = ?run.ctx.last_release.git_tag,
            commits = run.ctx.commits.len(),
            "release context ready"
        );
        Ok(run)
    }

    /// Load configuration and repository without a release version
    pub fn open(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = cli.working_dir()?;
        let config = match &cli.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => {
                let (config, path) = load_config_or_default(&cwd)?;
                if path.is_none() {
                    debug!("no configuration file found, using defaults");
                }
                config
            }
        };

        let repo = GitRepo::discover(&cwd)?;
        Ok(Self {
            config,
            ctx: ReleaseContext::new(cwd, String::new()).with_process_env(),
            repo,
            lockfiles: NpmLockfiles::new(),
            auth: NpmAuth::new(),
            publisher: NpmPublisher::new(),
        })
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            vcs: &self.repo,
            lockfiles: &self.lockfiles,
            auth: &self.auth,
            publisher: &self.publisher,
        }
    }
}

/// Context for releasing `args.next_version` from `cwd`
pub fn build_context(repo: &GitRepo, cwd: PathBuf, args: &ReleaseArgs) -> anyhow::Result<ReleaseContext> {
    let last_tag = match &args.last_tag {
        Some(tag) => Some(tag.clone()),
        None => repo.describe_head()?.last_tag_name,
    };
    let last_head = match &last_tag {
        Some(tag) => repo.tag_commit(tag)?,
        None => None,
    };
    let last_version = last_tag
        .as_deref()
        .map(|tag| tag.rsplit('@').next().unwrap_or(tag).trim_start_matches('v').to_string());

    let repository_url = match &args.repository_url {
        Some(url) => Some(url.clone()),
        None => repo.remote_url("origin").unwrap_or_else(|e| {
            debug!(error = %e, "no origin remote");
            None
        }),
    };

    let mut ctx = ReleaseContext::new(cwd, args.next_version.clone()).with_process_env();
    ctx.commits = repo.commits_since(last_head.as_deref())?;
    ctx.last_release = LastRelease {
        version: last_version,
        git_tag: last_tag,
        git_head: last_head,
    };
    ctx.next_release = NextRelease {
        version: args.next_version.clone(),
        channel: args.channel.clone().filter(|c| !c.is_empty()),
        git_tag: Some(format!("v{}", args.next_version)),
        git_head: Some(repo.head_hash()?),
    };
    ctx.options = ReleaseOptions { repository_url };
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn commit(repo: &Repository, message: &str) -> git2::Oid {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parents: Vec<git2::Commit<'_>> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn args(version: &str) -> ReleaseArgs {
        ReleaseArgs {
            next_version: version.to_string(),
            channel: None,
            last_tag: None,
            repository_url: None,
        }
    }

    #[test]
    fn test_context_since_last_tag() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        let first = commit(&repo, "chore: init");
        let object = repo.find_object(first, None).unwrap();
        repo.tag_lightweight("v1.0.0", &object, false).unwrap();
        std::fs::write(temp.path().join("b.txt"), "b").unwrap();
        commit(&repo, "feat: add b");
        repo.remote("origin", "git@github.com:acme/widgets.git").unwrap();

        let git = GitRepo::open(temp.path()).unwrap();
        let ctx = build_context(&git, temp.path().to_path_buf(), &args("1.1.0")).unwrap();

        assert_eq!(ctx.last_release.git_tag.as_deref(), Some("v1.0.0"));
        assert_eq!(ctx.last_release.version.as_deref(), Some("1.0.0"));
        assert_eq!(ctx.last_release.git_head, Some(first.to_string()));
        assert_eq!(ctx.commits.len(), 1);
        assert_eq!(ctx.commits[0].message, "feat: add b");
        assert_eq!(ctx.next_release.git_tag.as_deref(), Some("v1.1.0"));
        assert_eq!(
            ctx.options.repository_url.as_deref(),
            Some("git@github.com:acme/widgets.git")
        );
    }

    #[test]
    fn test_context_without_tags() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        commit(&repo, "feat: first");
        std::fs::write(temp.path().join("b.txt"), "b").unwrap();
        commit(&repo, "fix: second");

        let git = GitRepo::open(temp.path()).unwrap();
        let mut release = args("1.0.0");
        release.channel = Some("next".to_string());
        let ctx = build_context(&git, temp.path().to_path_buf(), &release).unwrap();

        assert!(ctx.last_release.git_tag.is_none());
        assert_eq!(ctx.commits.len(), 2);
        assert_eq!(ctx.next_release.channel.as_deref(), Some("next"));
        assert!(ctx.options.repository_url.is_none());
    }
}
