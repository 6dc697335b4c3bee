//! Registry publication of the workspace packages

use tracing::{info, instrument};

use crate::config::{validate_config, PluginConfig};
use crate::error::{AggregateError, Result};
use crate::monorepo::load_packages;
use crate::session::ReleaseSession;
use crate::types::{ReleaseContext, ReleaseInfo};

use super::{root_package, Collaborators};

/// Publish every package not yet on the registry.
///
/// Returns `None` when publishing is disabled with `npmPublish: false`.
#[instrument(skip_all, fields(version = %ctx.next_release.version))]
pub fn publish(
    config: &PluginConfig,
    ctx: &ReleaseContext,
    session: &mut ReleaseSession,
    collaborators: Collaborators<'_>,
) -> Result<Option<ReleaseInfo>> {
    let mut errors = AggregateError::new();
    if !session.verified {
        errors.extend(validate_config(config));
    }

    let root = match root_package(config, ctx) {
        Ok(root) => Some(root),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    if let Some(root) = &root {
        if !session.verified && config.publish_enabled() && !root.is_private() {
            if let Err(e) = collaborators.auth.verify_auth(session, root, ctx) {
                errors.push(e);
            }
        }
    }
    errors.into_result()?;

    if !config.publish_enabled() {
        info!("Skip publishing to npm registry as npmPublish false");
        return Ok(None);
    }

    let Some(root) = root else {
        return Ok(None);
    };

    info!("Publishing version {} to npm registry", ctx.next_release.version);
    let packages = load_packages(&ctx.cwd)?;
    let npmrc = session.npmrc_path()?;
    let release = collaborators
        .publisher
        .publish_from_package(&root, &packages, &npmrc, ctx)?;

    Ok(Some(release))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ManifestError, TandemError};
    use crate::monorepo::changes::tests::FakeVcs;
    use crate::workflow::fakes::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), ".", json!({"name": "root", "version": "1.0.0"}));
        write_manifest(temp.path(), "packages/a", json!({"name": "a", "version": "1.0.0"}));
        write_manifest(temp.path(), "packages/b", json!({"name": "b", "version": "1.0.0"}));
        temp
    }

    fn publish_with(
        temp: &TempDir,
        config: &PluginConfig,
        session: &mut ReleaseSession,
        auth: &FakeAuth,
        publisher: &FakePublisher,
    ) -> Result<Option<ReleaseInfo>> {
        let (vcs, lockfiles) = (FakeVcs::default(), FakeLockfiles::default());
        let collaborators = Collaborators {
            vcs: &vcs,
            lockfiles: &lockfiles,
            auth,
            publisher,
        };
        let ctx = ReleaseContext::new(temp.path(), "1.0.0");
        publish(config, &ctx, session, collaborators)
    }

    #[test]
    fn test_publish_all_packages() {
        let temp = workspace();
        let (auth, publisher) = (FakeAuth::default(), FakePublisher::default());
        let mut session = ReleaseSession::new();

        let release = publish_with(&temp, &PluginConfig::default(), &mut session, &auth, &publisher)
            .unwrap()
            .unwrap();

        assert_eq!(*publisher.published.borrow(), vec!["a", "b"]);
        assert_eq!(*auth.calls.borrow(), 1);
        assert_eq!(release.url.as_deref(), Some("https://www.npmjs.com/package/root/v/1.0.0"));
    }

    #[test]
    fn test_publish_skips_auth_when_verified() {
        let temp = workspace();
        let (auth, publisher) = (FakeAuth::default(), FakePublisher::default());
        let mut session = ReleaseSession::new();
        session.verified = true;

        publish_with(&temp, &PluginConfig::default(), &mut session, &auth, &publisher).unwrap();
        assert_eq!(*auth.calls.borrow(), 0);
    }

    #[test]
    fn test_publish_disabled() {
        let temp = workspace();
        let (auth, publisher) = (FakeAuth::default(), FakePublisher::default());
        let config = PluginConfig {
            npm_publish: Some(false),
            ..Default::default()
        };
        let mut session = ReleaseSession::new();

        let release = publish_with(&temp, &config, &mut session, &auth, &publisher).unwrap();
        assert!(release.is_none());
        assert!(publisher.published.borrow().is_empty());
        assert_eq!(*auth.calls.borrow(), 0);
    }

    #[test]
    fn test_publish_private_root_skips_auth() {
        let temp = workspace();
        write_manifest(
            temp.path(),
            ".",
            json!({"name": "root", "version": "1.0.0", "private": true}),
        );
        let (publisher, auth) = (
            FakePublisher::default(),
            FakeAuth {
                reject: true,
                ..Default::default()
            },
        );
        let mut session = ReleaseSession::new();

        let release = publish_with(&temp, &PluginConfig::default(), &mut session, &auth, &publisher)
            .unwrap();
        assert!(release.is_some());
        assert_eq!(*auth.calls.borrow(), 0);
    }

    #[test]
    fn test_publish_missing_root_manifest() {
        let temp = TempDir::new().unwrap();
        let (auth, publisher) = (FakeAuth::default(), FakePublisher::default());
        let mut session = ReleaseSession::new();

        let err = publish_with(&temp, &PluginConfig::default(), &mut session, &auth, &publisher)
            .unwrap_err();
        assert!(matches!(
            err.flatten()[0],
            TandemError::Manifest(ManifestError::NotFound(_))
        ));
    }
}
