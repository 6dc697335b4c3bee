//! `.npmrc` reading and registry resolution

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use tandem_core::error::Result;
use tandem_core::monorepo::Package;
use tandem_core::types::ReleaseContext;

/// The public npm registry
pub const OFFICIAL_REGISTRY: &str = "https://registry.npmjs.org/";

/// Key/value settings of one or more `.npmrc` files; later files win
#[derive(Debug, Clone, Default)]
pub struct Npmrc {
    values: BTreeMap<String, String>,
    /// Raw text of every file read, in read order
    sources: Vec<String>,
}

impl Npmrc {
    /// Parse one file's content
    pub fn parse(content: &str) -> Self {
        let mut npmrc = Self::default();
        npmrc.merge(content);
        npmrc
    }

    /// Read existing files from `paths`, skipping missing ones
    pub fn read(paths: &[PathBuf]) -> Result<Self> {
        let mut npmrc = Self::default();
        for path in paths.iter().filter(|p| p.is_file()) {
            debug!(path = %path.display(), "reading npm config");
            npmrc.merge(&std::fs::read_to_string(path)?);
        }
        Ok(npmrc)
    }

    fn merge(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim().trim_matches('"');
                self.values.insert(key.trim().to_string(), value.to_string());
            }
        }
        self.sources.push(content.to_string());
    }

    /// Raw value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Contents of all files read, joined by newlines
    pub fn contents(&self) -> String {
        self.sources.join("\n")
    }

    /// Whether no file was read
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether credentials for `registry` are configured.
    ///
    /// Looks for `_authToken`, `_auth` or `username` + `_password` under the
    /// registry's nerf dart and each of its parent paths. `${VAR}` values are
    /// expanded from `env`; unset variables count as missing.
    pub fn has_auth(&self, registry: &str, env: &BTreeMap<String, String>) -> bool {
        let Some(nerf) = nerf_dart(registry) else {
            return false;
        };

        let expanded = |key: String| {
            self.get(&key)
                .map(|value| expand_env(value, env))
                .filter(|value| !value.is_empty())
        };

        let mut scope = nerf.as_str();
        loop {
            if expanded(format!("{}:_authToken", scope)).is_some()
                || expanded(format!("{}:_auth", scope)).is_some()
                || (expanded(format!("{}:username", scope)).is_some()
                    && expanded(format!("{}:_password", scope)).is_some())
            {
                return true;
            }

            // "//host/a/b/" -> "//host/a/"
            let trimmed = scope.trim_end_matches('/');
            match trimmed.rfind('/') {
                Some(pos) if pos > 1 => scope = &scope[..=pos],
                _ => return false,
            }
        }
    }
}

/// Replace `${VAR}` references with values from `env`
fn expand_env(value: &str, env: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 2..start + end];
        out.push_str(env.get(name).map(String::as_str).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    out
}

/// `//host[:port]/path/` key prefix used for per-registry settings
pub fn nerf_dart(registry: &str) -> Option<String> {
    let url = Url::parse(registry).ok()?;
    let host = url.host_str()?;
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    let path = url.path();
    let dir = path.rfind('/').map(|pos| &path[..=pos]).unwrap_or("/");
    Some(format!("//{}{}{}", host, port, dir))
}

/// The user config file of the run: `NPM_CONFIG_USERCONFIG` or `<cwd>/.npmrc`
pub fn user_config_path(ctx: &ReleaseContext) -> PathBuf {
    ctx.env_var("NPM_CONFIG_USERCONFIG")
        .map(|p| ctx.cwd.join(p))
        .unwrap_or_else(|| ctx.cwd.join(".npmrc"))
}

/// Config files consulted for the run, lowest precedence first
pub fn config_paths(ctx: &ReleaseContext, home: Option<&Path>) -> Vec<PathBuf> {
    let user = user_config_path(ctx);
    let mut paths: Vec<PathBuf> = home
        .map(|h| h.join(".npmrc"))
        .into_iter()
        .filter(|p| p != &user)
        .collect();
    paths.push(user);
    paths
}

/// Registry `root` publishes to.
///
/// `publishConfig.registry`, then `NPM_CONFIG_REGISTRY`, then the scoped or
/// plain `registry` setting of the npm config, then the public registry.
pub fn registry(root: &Package, ctx: &ReleaseContext, npmrc: &Npmrc) -> String {
    if let Some(registry) = root.publish_registry() {
        return registry.to_string();
    }
    if let Some(registry) = ctx
        .env_var("NPM_CONFIG_REGISTRY")
        .or_else(|| ctx.env_var("npm_config_registry"))
    {
        return registry.to_string();
    }

    let scoped = root
        .name
        .strip_prefix('@')
        .and_then(|name| name.split_once('/'))
        .and_then(|(scope, _)| npmrc.get(&format!("@{}:registry", scope)));
    scoped
        .or_else(|| npmrc.get("registry"))
        .unwrap_or(OFFICIAL_REGISTRY)
        .to_string()
}

/// Whether `registry` is the public npm registry
pub fn is_official_registry(registry: &str) -> bool {
    registry.trim_end_matches('/') == OFFICIAL_REGISTRY.trim_end_matches('/')
}
