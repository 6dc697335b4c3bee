//! Publishing workspace packages to the npm registry

use std::path::{Path, PathBuf};

use node_semver::Range;
use tracing::{debug, info, instrument};

use tandem_core::collaborators::Publisher;
use tandem_core::error::Result;
use tandem_core::monorepo::Package;
use tandem_core::types::{ReleaseContext, ReleaseInfo};

use crate::command::{run_checked, CommandRunner, Invocation, SystemRunner};
use crate::npmrc::{config_paths, is_official_registry, registry, Npmrc};

/// Dist tag for a release channel.
///
/// `latest` without a channel, `release-<channel>` when the channel is a
/// version range (maintenance branches like `1.x`), the channel otherwise.
pub fn dist_tag(channel: Option<&str>) -> String {
    match channel.filter(|c| !c.is_empty()) {
        None => "latest".to_string(),
        Some(channel) if Range::parse(channel).is_ok() => format!("release-{}", channel),
        Some(channel) => channel.to_string(),
    }
}

/// Release info reported for the root package
pub fn release_info(root: &Package, ctx: &ReleaseContext, dist_tag: &str, registry: &str) -> ReleaseInfo {
    ReleaseInfo {
        name: format!("npm package (@{} dist-tag)", dist_tag),
        url: is_official_registry(registry).then(|| {
            format!(
                "https://www.npmjs.com/package/{}/v/{}",
                root.name, ctx.next_release.version
            )
        }),
        channel: ctx.next_release.channel.clone(),
    }
}

/// Publishes every public package whose version is not on the registry yet
#[derive(Debug)]
pub struct NpmPublisher<R = SystemRunner> {
    runner: R,
    home: Option<PathBuf>,
}

impl NpmPublisher<SystemRunner> {
    pub fn new() -> Self {
        Self {
            runner: SystemRunner,
            home: dirs::home_dir(),
        }
    }
}

impl Default for NpmPublisher<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> NpmPublisher<R> {
    /// Use a custom command runner and home directory
    pub fn with_runner(runner: R, home: Option<PathBuf>) -> Self {
        Self { runner, home }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Whether `pkg` at its current version is already on `registry`
    fn is_published(&self, pkg: &Package, registry: &str, npmrc: &Path, ctx: &ReleaseContext) -> Result<bool> {
        let spec = format!("{}@{}", pkg.name, pkg.version());
        let view = Invocation::new("npm", &ctx.cwd)
            .args(["view", spec.as_str(), "version"])
            .args(["--registry", registry])
            .arg("--userconfig")
            .arg(npmrc.display().to_string())
            .envs(&ctx.env);

        // npm view fails with E404 for unpublished packages
        let output = self.runner.run(&view)?;
        Ok(output.success && output.stdout.trim() == pkg.version())
    }
}

impl<R: CommandRunner> Publisher for NpmPublisher<R> {
    #[instrument(skip_all, fields(version = %ctx.next_release.version, package_count = packages.len()))]
    fn publish_from_package(
        &self,
        root: &Package,
        packages: &[Package],
        npmrc: &Path,
        ctx: &ReleaseContext,
    ) -> Result<ReleaseInfo> {
        let config = Npmrc::read(&config_paths(ctx, self.home.as_deref()))?;
        let registry = registry(root, ctx, &config);
        let dist_tag = dist_tag(ctx.next_release.channel.as_deref());

        for pkg in packages.iter().filter(|p| !p.is_private()) {
            if self.is_published(pkg, &registry, npmrc, ctx)? {
                info!("{}@{} is already published, skipping", pkg.name, pkg.version());
                continue;
            }

            info!("Publishing {}@{} with dist-tag {}", pkg.name, pkg.version(), dist_tag);
            let publish = Invocation::new("npm", &ctx.cwd)
                .arg("publish")
                .arg(pkg.location.display().to_string())
                .args(["--tag", dist_tag.as_str()])
                .args(["--registry", registry.as_str()])
                .arg("--userconfig")
                .arg(npmrc.display().to_string())
                .envs(&ctx.env);
            run_checked(&self.runner, &publish)?;
        }

        debug!(%registry, %dist_tag, "publish finished");
        Ok(release_info(root, ctx, &dist_tag, &registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::ScriptedRunner;
    use serde_json::json;
    use tandem_core::TandemError;

    fn package(dir: &str, data: serde_json::Value) -> Package {
        Package::from_json(Path::new(dir), data).unwrap()
    }

    fn workspace() -> (Package, Vec<Package>) {
        let root = package("/repo", json!({"name": "monorepo", "version": "2.0.0"}));
        let packages = vec![
            package("/repo/packages/a", json!({"name": "a", "version": "2.0.0"})),
            package("/repo/packages/b", json!({"name": "b", "version": "2.0.0"})),
            package(
                "/repo/packages/internal",
                json!({"name": "internal", "version": "2.0.0", "private": true}),
            ),
        ];
        (root, packages)
    }

    #[test]
    fn test_dist_tag() {
        assert_eq!(dist_tag(None), "latest");
        assert_eq!(dist_tag(Some("")), "latest");
        assert_eq!(dist_tag(Some("next")), "next");
        assert_eq!(dist_tag(Some("1.x")), "release-1.x");
    }

    #[test]
    fn test_release_info() {
        let (root, _) = workspace();
        let mut ctx = ReleaseContext::new("/repo", "2.0.0");
        ctx.next_release.channel = Some("beta".to_string());

        let info = release_info(&root, &ctx, "beta", "https://registry.npmjs.org");
        assert_eq!(info.name, "npm package (@beta dist-tag)");
        assert_eq!(
            info.url.as_deref(),
            Some("https://www.npmjs.com/package/monorepo/v/2.0.0")
        );
        assert_eq!(info.channel.as_deref(), Some("beta"));

        let info = release_info(&root, &ctx, "beta", "https://npm.example.com/");
        assert!(info.url.is_none());
    }

    #[test]
    fn test_publishes_unreleased_public_packages() {
        let (root, packages) = workspace();
        let runner = ScriptedRunner::default().respond("npm view a@2.0.0", true, "2.0.0\n");
        let publisher = NpmPublisher::with_runner(runner, None);
        let ctx = ReleaseContext::new("/repo", "2.0.0");

        let info = publisher
            .publish_from_package(&root, &packages, Path::new("/tmp/.npmrc"), &ctx)
            .unwrap();

        assert_eq!(info.name, "npm package (@latest dist-tag)");
        assert_eq!(
            publisher.runner().command_lines(),
            vec![
                "npm view a@2.0.0 version --registry https://registry.npmjs.org/ --userconfig /tmp/.npmrc",
                "npm view b@2.0.0 version --registry https://registry.npmjs.org/ --userconfig /tmp/.npmrc",
                "npm publish /repo/packages/b --tag latest --registry https://registry.npmjs.org/ --userconfig /tmp/.npmrc",
            ]
        );
    }

    #[test]
    fn test_publish_failure_stops() {
        let (root, packages) = workspace();
        let runner = ScriptedRunner::default()
            .respond("npm view", false, "")
            .respond("npm publish /repo/packages/a", false, "");
        let publisher = NpmPublisher::with_runner(runner, None);
        let ctx = ReleaseContext::new("/repo", "2.0.0");

        let err = publisher
            .publish_from_package(&root, &packages, Path::new("/tmp/.npmrc"), &ctx)
            .unwrap_err();
        assert!(matches!(err, TandemError::Command(_)));
        assert_eq!(publisher.runner().command_lines().len(), 2);
    }
}
