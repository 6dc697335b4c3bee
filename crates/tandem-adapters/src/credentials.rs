//! Registry credentials for the session npmrc

use std::path::PathBuf;

use tracing::{info, instrument};

use tandem_core::collaborators::RegistryAuth;
use tandem_core::error::{AuthError, Result};
use tandem_core::monorepo::Package;
use tandem_core::session::ReleaseSession;
use tandem_core::types::ReleaseContext;

use crate::command::{CommandRunner, Invocation, SystemRunner};
use crate::npmrc::{config_paths, nerf_dart, registry, Npmrc};

/// Writes registry credentials to the session npmrc and checks them with `npm whoami`
#[derive(Debug)]
pub struct NpmAuth<R = SystemRunner> {
    runner: R,
    /// Home directory holding the user-level `.npmrc`
    home: Option<PathBuf>,
}

impl NpmAuth<SystemRunner> {
    pub fn new() -> Self {
        Self {
            runner: SystemRunner,
            home: dirs::home_dir(),
        }
    }
}

impl Default for NpmAuth<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> NpmAuth<R> {
    /// Use a custom command runner and home directory
    pub fn with_runner(runner: R, home: Option<PathBuf>) -> Self {
        Self { runner, home }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Session npmrc content granting access to `registry`
    fn npmrc_content(&self, registry: &str, npmrc: &Npmrc, ctx: &ReleaseContext) -> Result<String> {
        let current = npmrc.contents();

        if npmrc.has_auth(registry, &ctx.env) {
            return Ok(current);
        }

        let no_token = || AuthError::NoToken {
            registry: registry.to_string(),
        };
        if ctx.env_var("NPM_TOKEN").is_none() {
            return Err(no_token().into());
        }
        let nerf = nerf_dart(registry).ok_or_else(no_token)?;

        let mut content = if current.is_empty() {
            String::new()
        } else {
            format!("{}\n", current)
        };
        content.push_str(&format!("{}:_authToken = ${{NPM_TOKEN}}", nerf));
        Ok(content)
    }
}

impl<R: CommandRunner> RegistryAuth for NpmAuth<R> {
    #[instrument(skip_all, fields(package = %root.name))]
    fn verify_auth(
        &self,
        session: &mut ReleaseSession,
        root: &Package,
        ctx: &ReleaseContext,
    ) -> Result<()> {
        let npmrc = Npmrc::read(&config_paths(ctx, self.home.as_deref()))?;
        let registry = registry(root, ctx, &npmrc);
        info!("Verify authentication for registry {}", registry);

        let content = self.npmrc_content(&registry, &npmrc, ctx)?;
        let path = session.npmrc_path()?;
        if session.npmrc.write_once(&content)? && !npmrc.has_auth(&registry, &ctx.env) {
            info!("Wrote NPM_TOKEN to {}", path.display());
        }

        let whoami = Invocation::new("npm", &ctx.cwd)
            .arg("whoami")
            .arg("--userconfig")
            .arg(path.display().to_string())
            .arg("--registry")
            .arg(registry.as_str())
            .envs(&ctx.env);
        let output = self.runner.run(&whoami)?;
        if !output.success {
            return Err(AuthError::InvalidToken { registry }.into());
        }
        Ok(())
    }
}
