//! Workspace glob resolution and package loading

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ManifestError, Result};

use super::package::{Package, MANIFEST_FILE};

/// Glob used when no workspace declaration is found
pub const DEFAULT_PACKAGE_GLOB: &str = "packages/*";

/// Where the package globs were declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobSource {
    /// `packages` of pnpm-workspace.yaml
    Pnpm,
    /// `workspaces` of the root package.json
    PackageJson,
    /// `packages` of lerna.json
    Lerna,
    /// Nothing declared, fell back to the default glob
    Default,
}

impl GlobSource {
    /// File the globs were read from
    pub fn config_file(&self) -> Option<&'static str> {
        match self {
            Self::Pnpm => Some("pnpm-workspace.yaml"),
            Self::PackageJson => Some("package.json"),
            Self::Lerna => Some("lerna.json"),
            Self::Default => None,
        }
    }
}

impl std::fmt::Display for GlobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.config_file() {
            Some(file) => f.write_str(file),
            None => f.write_str("default"),
        }
    }
}

/// A multi-package workspace rooted at a directory
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root path of the workspace
    pub root: PathBuf,
    /// Glob patterns for package locations
    pub package_patterns: Vec<String>,
    /// Declaration the patterns came from
    pub source: GlobSource,
}

#[derive(Deserialize)]
struct PnpmWorkspace {
    packages: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Workspaces {
    List(Vec<String>),
    Object { packages: Option<Vec<String>> },
}

#[derive(Deserialize)]
struct RootManifest {
    workspaces: Option<Workspaces>,
}

#[derive(Deserialize)]
struct LernaConfig {
    packages: Option<Vec<String>>,
}

impl Workspace {
    /// Resolve the package globs declared for `root`
    pub fn detect(root: &Path) -> Result<Self> {
        debug!(root = %root.display(), "resolving workspace package globs");
        let (package_patterns, source) = Self::resolve_patterns(root)?;
        debug!(source = %source, patterns = ?package_patterns, "package globs resolved");

        Ok(Self {
            root: root.to_path_buf(),
            package_patterns,
            source,
        })
    }

    fn resolve_patterns(root: &Path) -> Result<(Vec<String>, GlobSource)> {
        let pnpm_workspace = root.join("pnpm-workspace.yaml");
        if pnpm_workspace.exists() {
            debug!("package manager 'pnpm' detected, resolving packages using pnpm-workspace.yaml");
            let content = std::fs::read_to_string(&pnpm_workspace).map_err(ConfigError::from)?;
            let config: PnpmWorkspace = serde_yaml::from_str(&content).map_err(ConfigError::from)?;
            return match config.packages {
                Some(packages) => Ok((packages, GlobSource::Pnpm)),
                None => Err(ConfigError::MissingPackages(pnpm_workspace).into()),
            };
        }

        let package_json = root.join(MANIFEST_FILE);
        if package_json.exists() {
            let content = std::fs::read_to_string(&package_json)?;
            let manifest: RootManifest =
                serde_json::from_str(&content).map_err(|e| ManifestError::ParseFailed {
                    path: package_json.clone(),
                    reason: e.to_string(),
                })?;
            let workspaces = match manifest.workspaces {
                Some(Workspaces::List(list)) => Some(list),
                Some(Workspaces::Object { packages }) => packages,
                None => None,
            };
            if let Some(workspaces) = workspaces {
                return Ok((workspaces, GlobSource::PackageJson));
            }
        }

        let lerna_json = root.join("lerna.json");
        if lerna_json.exists() {
            let content = std::fs::read_to_string(&lerna_json)?;
            let config: LernaConfig =
                serde_json::from_str(&content).map_err(|e| ManifestError::ParseFailed {
                    path: lerna_json.clone(),
                    reason: e.to_string(),
                })?;
            if let Some(packages) = config.packages {
                return Ok((packages, GlobSource::Lerna));
            }
        }

        warn!(
            "No packages defined in lerna.json. Defaulting to packages in {}",
            DEFAULT_PACKAGE_GLOB
        );
        Ok((vec![DEFAULT_PACKAGE_GLOB.to_string()], GlobSource::Default))
    }

    /// Manifest paths matched by the package globs, sorted and deduplicated
    pub fn manifest_paths(&self) -> Result<Vec<PathBuf>> {
        let has_globstar = self.package_patterns.iter().any(|p| p.contains("**"));
        if has_globstar
            && self
                .package_patterns
                .iter()
                .any(|p| p.contains("node_modules"))
        {
            return Err(ConfigError::GlobstarNodeModules.into());
        }

        let (excludes, includes): (Vec<&String>, Vec<&String>) = self
            .package_patterns
            .iter()
            .partition(|p| p.starts_with('!'));

        let mut exclude_set = globset::GlobSetBuilder::new();
        for pattern in &excludes {
            let pattern = pattern.trim_start_matches('!').trim_end_matches('/');
            exclude_set.add(glob_for(pattern)?);
        }
        if has_globstar {
            exclude_set.add(glob_for("**/node_modules/**")?);
        }
        let exclude_set = exclude_set.build().map_err(|e| ConfigError::InvalidValue {
            field: "packages".to_string(),
            message: e.to_string(),
        })?;

        let mut manifests = BTreeSet::new();
        for pattern in includes {
            let pattern = pattern.trim_end_matches('/');
            let full_pattern = self.root.join(pattern).join(MANIFEST_FILE);
            let full_pattern = full_pattern.to_string_lossy();

            let entries = glob::glob(&full_pattern).map_err(|e| ConfigError::InvalidValue {
                field: "packages".to_string(),
                message: format!("{}: {}", pattern, e),
            })?;

            for entry in entries.flatten() {
                let Some(dir) = entry.parent() else { continue };
                let relative = dir.strip_prefix(&self.root).unwrap_or(dir);
                if exclude_set.is_match(relative) || exclude_set.is_match(&entry) {
                    continue;
                }
                manifests.insert(normalize_path(&entry));
            }
        }

        Ok(manifests.into_iter().collect())
    }

    /// Load every package of the workspace
    pub fn load_packages(&self) -> Result<Vec<Package>> {
        let packages = self
            .manifest_paths()?
            .iter()
            .map(|manifest| {
                let location = manifest.parent().unwrap_or(&self.root);
                Package::load(location)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "{} package{} found: {:?}",
            packages.len(),
            if packages.len() == 1 { "" } else { "s" },
            packages.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );
        Ok(packages)
    }
}

/// Load the packages of the workspace rooted at `root`
pub fn load_packages(root: &Path) -> Result<Vec<Package>> {
    Workspace::detect(root)?.load_packages()
}

fn glob_for(pattern: &str) -> Result<globset::Glob> {
    globset::GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| {
            ConfigError::InvalidValue {
                field: "packages".to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

/// Lexically normalize a path, resolving `.` and `..` components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
