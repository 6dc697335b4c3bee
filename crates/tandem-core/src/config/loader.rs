//! Configuration loading
//!
//! A missing file means defaults. A file that exists but does not parse is an
//! error, so a mistyped key never silently turns into its default.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::PluginConfig;

/// Syntax of a configuration file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    fn parse(self, content: &str) -> Result<PluginConfig> {
        let config = match self {
            Self::Toml => toml::from_str(content).map_err(ConfigError::from)?,
            Self::Yaml => serde_yaml::from_str(content).map_err(ConfigError::from)?,
        };
        Ok(config)
    }
}

/// Read and deserialize the configuration file at `path`
pub fn load_config(path: &Path) -> Result<PluginConfig> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let format = ConfigFormat::from_path(path);
    debug!(path = %path.display(), ?format, "reading configuration");
    let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
    let config = format.parse(&content)?;

    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Config file locations checked in one directory, in priority order
fn candidates(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    config_file_names()
        .into_iter()
        .flat_map(move |name| [dir.join(name), dir.join(".github").join(name)])
}

/// Nearest configuration file, looking in `start_dir` and then its ancestors.
///
/// At each level `<dir>/<name>` is checked before `<dir>/.github/<name>`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let found = start_dir
        .ancestors()
        .flat_map(candidates)
        .find(|path| path.is_file());

    match &found {
        Some(path) => debug!(path = %path.display(), "found config file"),
        None => debug!(start_dir = %start_dir.display(), "no config file found"),
    }
    found
}

/// Configuration for `dir`, defaults when no file exists.
///
/// Returns the path of the file that was loaded.
pub fn load_config_or_default(dir: &Path) -> Result<(PluginConfig, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => Ok((PluginConfig::default(), None)),
    }
}
