//! Package manager detection and lockfile maintenance

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use tandem_core::collaborators::LockfileUpdater;
use tandem_core::error::Result;
use tandem_core::manifest::JsonFile;
use tandem_core::types::ReleaseContext;

use crate::command::{run_checked, CommandRunner, Invocation, SystemRunner};

/// npm lockfiles that carry the package's own version
const NPM_LOCKFILES: &[&str] = &["package-lock.json", "npm-shrinkwrap.json"];

/// Supported package managers, in detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    pub const ALL: [PackageManager; 3] = [Self::Npm, Self::Pnpm, Self::Yarn];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }

    /// Lockfile written by this package manager
    pub fn lockfile(&self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Yarn => "yarn.lock",
        }
    }

    fn update_args(&self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["install", "--package-lock-only", "--ignore-scripts", "--no-audit"],
            Self::Pnpm => &["install", "--lockfile-only", "--ignore-scripts"],
            Self::Yarn => &["install"],
        }
    }

    /// First package manager whose lockfile exists in `location`, npm otherwise
    pub fn detect(location: &Path) -> Self {
        Self::ALL
            .into_iter()
            .find(|pm| location.join(pm.lockfile()).exists())
            .unwrap_or(Self::Npm)
    }

    /// Command refreshing the lockfile in `location`; npm also gets the session npmrc
    pub fn update_lockfile_command(
        &self,
        location: &Path,
        npmrc: &Path,
        ctx: &ReleaseContext,
    ) -> Invocation {
        let invocation = Invocation::new(self.name(), location)
            .args(self.update_args().iter().copied())
            .envs(&ctx.env);
        match self {
            Self::Npm => invocation
                .arg("--userconfig")
                .arg(npmrc.display().to_string()),
            _ => invocation,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lockfile updater backed by the detected package manager
#[derive(Debug, Default)]
pub struct NpmLockfiles<R = SystemRunner> {
    runner: R,
}

impl NpmLockfiles<SystemRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CommandRunner> NpmLockfiles<R> {
    /// Use a custom command runner
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> LockfileUpdater for NpmLockfiles<R> {
    #[instrument(skip_all, fields(location = %location.display()))]
    fn update_lockfile(&self, location: &Path, npmrc: &Path, ctx: &ReleaseContext) -> Result<()> {
        let package_manager = PackageManager::detect(location);
        let lockfile = package_manager.lockfile();

        if !location.join(lockfile).exists() {
            debug!(%package_manager, "no lockfile, skipping update");
            return Ok(());
        }

        info!("Update {} file in {}", lockfile, location.display());
        let command = package_manager.update_lockfile_command(location, npmrc, ctx);
        run_checked(&self.runner, &command)?;
        Ok(())
    }

    fn sync_lock_version(&self, location: &Path, version: &str) -> Result<()> {
        for name in NPM_LOCKFILES {
            let path = location.join(name);
            if !path.exists() {
                continue;
            }

            let mut lock = JsonFile::load(&path)?;
            lock.set_str("version", version);
            if let Some(root) = lock
                .data_mut()
                .get_mut("packages")
                .and_then(|packages| packages.get_mut(""))
                .and_then(Value::as_object_mut)
            {
                root.insert("version".to_string(), Value::String(version.to_string()));
            }
            lock.save()?;
            debug!(path = %path.display(), version, "lockfile version updated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::ScriptedRunner;
    use tandem_core::TandemError;
    use tempfile::TempDir;

    #[test]
    fn test_detect() {
        let temp = TempDir::new().unwrap();
        assert_eq!(PackageManager::detect(temp.path()), PackageManager::Npm);

        std::fs::write(temp.path().join("yarn.lock"), "").unwrap();
        assert_eq!(PackageManager::detect(temp.path()), PackageManager::Yarn);

        std::fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(PackageManager::detect(temp.path()), PackageManager::Pnpm);

        std::fs::write(temp.path().join("package-lock.json"), "{}").unwrap();
        assert_eq!(PackageManager::detect(temp.path()), PackageManager::Npm);
    }

    #[test]
    fn test_update_commands() {
        let ctx = ReleaseContext::new("/repo", "1.0.0");
        let npmrc = Path::new("/tmp/session/.npmrc");

        let npm = PackageManager::Npm.update_lockfile_command(Path::new("/repo"), npmrc, &ctx);
        assert_eq!(
            npm.command_line(),
            "npm install --package-lock-only --ignore-scripts --no-audit --userconfig /tmp/session/.npmrc"
        );

        let pnpm = PackageManager::Pnpm.update_lockfile_command(Path::new("/repo"), npmrc, &ctx);
        assert_eq!(pnpm.command_line(), "pnpm install --lockfile-only --ignore-scripts");
        assert_eq!(
            PackageManager::Yarn
                .update_lockfile_command(Path::new("/repo"), npmrc, &ctx)
                .command_line(),
            "yarn install"
        );
    }

    #[test]
    fn test_update_skipped_without_lockfile() {
        let temp = TempDir::new().unwrap();
        let lockfiles = NpmLockfiles::with_runner(ScriptedRunner::default());
        let ctx = ReleaseContext::new(temp.path(), "1.0.0");

        lockfiles
            .update_lockfile(temp.path(), Path::new("/tmp/.npmrc"), &ctx)
            .unwrap();
        assert!(lockfiles.runner().command_lines().is_empty());
    }

    #[test]
    fn test_update_runs_in_package_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("pnpm-lock.yaml"), "lockfileVersion: 6\n").unwrap();
        let lockfiles = NpmLockfiles::with_runner(ScriptedRunner::default());
        let ctx = ReleaseContext::new(temp.path(), "1.0.0");

        lockfiles
            .update_lockfile(temp.path(), Path::new("/tmp/.npmrc"), &ctx)
            .unwrap();

        let calls = lockfiles.runner().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "pnpm");
        assert_eq!(calls[0].cwd, temp.path());
    }

    #[test]
    fn test_update_failure_propagates() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("yarn.lock"), "").unwrap();
        let lockfiles = NpmLockfiles::with_runner(ScriptedRunner::default().respond("yarn", false, ""));
        let ctx = ReleaseContext::new(temp.path(), "1.0.0");

        let err = lockfiles
            .update_lockfile(temp.path(), Path::new("/tmp/.npmrc"), &ctx)
            .unwrap_err();
        assert!(matches!(err, TandemError::Command(_)));
    }

    #[test]
    fn test_sync_lock_version() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package-lock.json"),
            "{\n    \"name\": \"foo\",\n    \"version\": \"1.0.0\",\n    \"packages\": {\n        \"\": {\n            \"name\": \"foo\",\n            \"version\": \"1.0.0\"\n        }\n    }\n}\n",
        )
        .unwrap();

        NpmLockfiles::new()
            .sync_lock_version(temp.path(), "1.1.0")
            .unwrap();

        let content = std::fs::read_to_string(temp.path().join("package-lock.json")).unwrap();
        let lock: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(lock["version"], "1.1.0");
        assert_eq!(lock["packages"][""]["version"], "1.1.0");
        assert!(content.starts_with("{\n    \"name\""));
        assert!(!temp.path().join("npm-shrinkwrap.json").exists());
    }
}
