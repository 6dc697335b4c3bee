//! Pre-release condition checks

use tracing::{debug, info, instrument};

use crate::collaborators::VersionControl;
use crate::config::{validate_config, PluginConfig};
use crate::error::{AggregateError, GitError, Result};
use crate::session::ReleaseSession;
use crate::types::ReleaseContext;

use super::{root_package, Collaborators};

/// Fail when tracked files have uncommitted changes
pub fn verify_git(vcs: &dyn VersionControl) -> Result<()> {
    let files = vcs.uncommitted_tracked_files()?;
    if files.is_empty() {
        return Ok(());
    }
    debug!(?files, "working copy has uncommitted changes");
    Err(GitError::DirtyWorkingCopy { files }.into())
}

/// Check configuration, working copy and registry credentials.
///
/// Every failure is collected and reported together. On success the session
/// is marked verified so later hooks skip repeating the checks.
#[instrument(skip_all, fields(cwd = %ctx.cwd.display()))]
pub fn verify_conditions(
    config: &PluginConfig,
    ctx: &ReleaseContext,
    session: &mut ReleaseSession,
    collaborators: Collaborators<'_>,
) -> Result<()> {
    let mut errors = AggregateError::from(validate_config(config));

    if let Err(e) = verify_git(collaborators.vcs) {
        errors.push(e);
    }

    if config.npm_verify_auth {
        let result = root_package(config, ctx)
            .and_then(|root| collaborators.auth.verify_auth(session, &root, ctx));
        if let Err(e) = result {
            errors.push(e);
        }
    } else {
        debug!("registry authentication check disabled");
    }

    errors.into_result()?;
    session.verified = true;
    info!("Conditions verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, TandemError};
    use crate::monorepo::changes::tests::FakeVcs;
    use crate::workflow::fakes::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ReleaseContext) {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), ".", json!({"name": "root", "version": "0.0.0"}));
        let ctx = ReleaseContext::new(temp.path(), "1.0.0");
        (temp, ctx)
    }

    #[test]
    fn test_verify_git_dirty() {
        let vcs = FakeVcs {
            dirty: vec!["package.json".to_string()],
            ..Default::default()
        };
        let err = verify_git(&vcs).unwrap_err();
        assert!(err.to_string().contains("package.json"));
        assert!(verify_git(&FakeVcs::default()).is_ok());
    }

    #[test]
    fn test_verify_conditions_marks_session() {
        let (_temp, ctx) = setup();
        let (vcs, lockfiles, auth, publisher) = (
            FakeVcs::default(),
            FakeLockfiles::default(),
            FakeAuth::default(),
            FakePublisher::default(),
        );
        let collaborators = Collaborators {
            vcs: &vcs,
            lockfiles: &lockfiles,
            auth: &auth,
            publisher: &publisher,
        };
        let mut session = ReleaseSession::new();

        verify_conditions(&PluginConfig::default(), &ctx, &mut session, collaborators).unwrap();
        assert!(session.verified);
        assert_eq!(*auth.calls.borrow(), 1);
        assert!(session.npmrc.is_written());
    }

    #[test]
    fn test_verify_conditions_aggregates_errors() {
        let (_temp, ctx) = setup();
        let vcs = FakeVcs {
            dirty: vec!["src/index.js".to_string()],
            ..Default::default()
        };
        let (lockfiles, publisher) = (FakeLockfiles::default(), FakePublisher::default());
        let auth = FakeAuth {
            reject: true,
            ..Default::default()
        };
        let collaborators = Collaborators {
            vcs: &vcs,
            lockfiles: &lockfiles,
            auth: &auth,
            publisher: &publisher,
        };
        let config = PluginConfig {
            latch: "sometimes".to_string(),
            ..Default::default()
        };
        let mut session = ReleaseSession::new();

        let err = verify_conditions(&config, &ctx, &mut session, collaborators).unwrap_err();
        let errors = err.flatten();
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            errors[0],
            TandemError::Config(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(errors[1], TandemError::Git(GitError::DirtyWorkingCopy { .. })));
        assert!(matches!(errors[2], TandemError::Auth(_)));
        assert!(!session.verified);
    }

    #[test]
    fn test_auth_skipped_when_disabled() {
        let temp = TempDir::new().unwrap();
        let ctx = ReleaseContext::new(temp.path(), "1.0.0");
        let (vcs, lockfiles, auth, publisher) = (
            FakeVcs::default(),
            FakeLockfiles::default(),
            FakeAuth::default(),
            FakePublisher::default(),
        );
        let collaborators = Collaborators {
            vcs: &vcs,
            lockfiles: &lockfiles,
            auth: &auth,
            publisher: &publisher,
        };
        let config = PluginConfig {
            npm_verify_auth: false,
            ..Default::default()
        };
        let mut session = ReleaseSession::new();

        verify_conditions(&config, &ctx, &mut session, collaborators).unwrap();
        assert_eq!(*auth.calls.borrow(), 0);
    }
}
