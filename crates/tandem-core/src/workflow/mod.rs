//! Lifecycle hooks: verify conditions, prepare and publish

mod prepare;
mod publish;
mod verify;

pub use prepare::*;
pub use publish::*;
pub use verify::*;

use std::path::PathBuf;

use crate::collaborators::{LockfileUpdater, Publisher, RegistryAuth, VersionControl};
use crate::config::PluginConfig;
use crate::error::Result;
use crate::monorepo::{normalize_path, Package};
use crate::types::ReleaseContext;

/// External systems the hooks talk to
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub vcs: &'a dyn VersionControl,
    pub lockfiles: &'a dyn LockfileUpdater,
    pub auth: &'a dyn RegistryAuth,
    pub publisher: &'a dyn Publisher,
}

/// Directory of the root package.json, `pkgRoot` resolved against the working directory
pub fn base_path(config: &PluginConfig, ctx: &ReleaseContext) -> PathBuf {
    match config.pkg_root.as_deref() {
        Some(root) => normalize_path(&ctx.cwd.join(root)),
        None => ctx.cwd.clone(),
    }
}

/// Load the root package of the run
pub fn root_package(config: &PluginConfig, ctx: &ReleaseContext) -> Result<Package> {
    Package::load(&base_path(config, ctx))
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::cell::RefCell;
    use std::path::Path;

    use super::*;
    use crate::error::AuthError;
    use crate::session::ReleaseSession;
    use crate::types::ReleaseInfo;

    /// Records lockfile calls instead of running a package manager
    #[derive(Default)]
    pub(crate) struct FakeLockfiles {
        pub updated: RefCell<Vec<PathBuf>>,
        pub synced: RefCell<Vec<(PathBuf, String)>>,
    }

    impl LockfileUpdater for FakeLockfiles {
        fn update_lockfile(&self, location: &Path, _npmrc: &Path, _ctx: &ReleaseContext) -> Result<()> {
            self.updated.borrow_mut().push(location.to_path_buf());
            Ok(())
        }

        fn sync_lock_version(&self, location: &Path, version: &str) -> Result<()> {
            self.synced
                .borrow_mut()
                .push((location.to_path_buf(), version.to_string()));
            Ok(())
        }
    }

    /// Accepts or rejects every token
    #[derive(Default)]
    pub(crate) struct FakeAuth {
        pub reject: bool,
        pub calls: RefCell<u32>,
    }

    impl RegistryAuth for FakeAuth {
        fn verify_auth(
            &self,
            session: &mut ReleaseSession,
            _root: &Package,
            _ctx: &ReleaseContext,
        ) -> Result<()> {
            *self.calls.borrow_mut() += 1;
            if self.reject {
                return Err(AuthError::NoToken {
                    registry: "https://registry.npmjs.org/".to_string(),
                }
                .into());
            }
            session.npmrc.write_once("//registry.npmjs.org/:_authToken = ${NPM_TOKEN}")?;
            Ok(())
        }
    }

    /// Remembers which packages it was asked to publish
    #[derive(Default)]
    pub(crate) struct FakePublisher {
        pub published: RefCell<Vec<String>>,
    }

    impl Publisher for FakePublisher {
        fn publish_from_package(
            &self,
            root: &Package,
            packages: &[Package],
            _npmrc: &Path,
            ctx: &ReleaseContext,
        ) -> Result<ReleaseInfo> {
            self.published
                .borrow_mut()
                .extend(packages.iter().map(|p| p.name.clone()));
            Ok(ReleaseInfo {
                name: "npm package (@latest dist-tag)".to_string(),
                url: Some(format!(
                    "https://www.npmjs.com/package/{}/v/{}",
                    root.name, ctx.next_release.version
                )),
                channel: None,
            })
        }
    }

    /// Write `manifest` as `dir/package.json`
    pub(crate) fn write_manifest(root: &Path, dir: &str, manifest: serde_json::Value) {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("package.json"),
            serde_json::to_string_pretty(&manifest).unwrap() + "\n",
        )
        .unwrap();
    }

    pub(crate) fn read_manifest(root: &Path, dir: &str) -> serde_json::Value {
        let content = std::fs::read_to_string(root.join(dir).join("package.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_path() {
        let ctx = ReleaseContext::new("/repo", "1.0.0");
        let mut config = PluginConfig::default();
        assert_eq!(base_path(&config, &ctx), PathBuf::from("/repo"));

        config.pkg_root = Some("./dist/../build".to_string());
        assert_eq!(base_path(&config, &ctx), PathBuf::from("/repo/build"));
    }
}
