//! Dependency graph for workspace packages

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use node_semver::{Range, Version};
use tracing::debug;

use crate::error::{GraphError, Result};

use super::package::{DependencyKind, Package};
use super::workspace::normalize_path;

/// A node in the dependency graph
#[derive(Debug, Clone)]
pub struct PackageNode {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Package directory
    pub location: PathBuf,
    /// Local packages whose declarations resolve to this one, in package order
    pub dependents: Vec<String>,
}

impl PackageNode {
    fn new(pkg: &Package) -> Self {
        Self {
            name: pkg.name.clone(),
            version: pkg.version().to_string(),
            location: normalize_path(&pkg.location),
            dependents: Vec::new(),
        }
    }

    fn add_dependent(&mut self, name: &str) {
        if !self.dependents.iter().any(|d| d == name) {
            self.dependents.push(name.to_string());
        }
    }

    /// Whether the node version satisfies a semver range
    pub fn satisfies(&self, range: &str) -> bool {
        let Ok(version) = Version::parse(&self.version) else {
            return false;
        };
        Range::parse(range)
            .map(|r| r.satisfies(&version))
            .unwrap_or(false)
    }
}

/// A dependency specifier resolved the way a package manager would
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSpec {
    /// A local directory (`file:`, `link:` or a relative path)
    Directory(PathBuf),
    /// A semver range or exact version
    Range(String),
    /// A git URL with a `#semver:` range or a committish
    Git(String),
    /// Tags, aliases and anything else that cannot match a local package
    Other,
}

impl ResolvedSpec {
    /// Resolve `spec` as declared by the package located in `from`
    pub fn resolve(spec: &str, from: &Path) -> Self {
        let spec = spec.trim();
        if let Some(path) = spec.strip_prefix("file:") {
            return Self::Directory(normalize_path(&from.join(path)));
        }
        if is_directory_spec(spec) {
            return Self::Directory(normalize_path(&from.join(spec)));
        }
        if is_git_spec(spec) {
            let fragment = spec.split_once('#').map(|(_, f)| f).unwrap_or_default();
            let fragment = fragment.strip_prefix("semver:").unwrap_or(fragment);
            return Self::Git(fragment.to_string());
        }
        if spec.starts_with("npm:") {
            return Self::Other;
        }
        if spec.is_empty() {
            return Self::Range("*".to_string());
        }
        Self::Range(spec.to_string())
    }

    /// Whether this resolution points at `node`
    pub fn matches(&self, node: &PackageNode) -> bool {
        match self {
            Self::Directory(path) => *path == node.location,
            Self::Range(range) | Self::Git(range) => node.satisfies(range),
            Self::Other => false,
        }
    }
}

fn is_directory_spec(spec: &str) -> bool {
    spec.starts_with("./")
        || spec.starts_with("../")
        || spec.starts_with('/')
        || spec.starts_with("~/")
        || spec == "."
        || spec == ".."
}

fn is_git_spec(spec: &str) -> bool {
    const GIT_PREFIXES: [&str; 8] = [
        "git+", "git:", "git@", "github:", "gitlab:", "bitbucket:", "gist:", "ssh:",
    ];
    if GIT_PREFIXES.iter().any(|p| spec.starts_with(p)) {
        return true;
    }
    // `owner/repo#ref` shorthand
    let base = spec.split('#').next().unwrap_or_default();
    !spec.starts_with('@')
        && base.split('/').count() == 2
        && !base.contains(' ')
        && !base.contains(':')
        && base.split('/').all(|s| !s.is_empty())
}

/// Dependency graph for workspace packages
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes indexed by package name
    nodes: HashMap<String, PackageNode>,
    /// Package names in the order packages were given
    order: Vec<String>,
}

impl DependencyGraph {
    /// Build a dependency graph from loaded packages
    pub fn build(packages: &[Package]) -> Result<Self> {
        check_duplicate_names(packages)?;

        let mut nodes: HashMap<String, PackageNode> = packages
            .iter()
            .map(|pkg| (pkg.name.clone(), PackageNode::new(pkg)))
            .collect();
        let order: Vec<String> = packages.iter().map(|p| p.name.clone()).collect();

        for pkg in packages {
            for (dep_name, spec) in merged_dependencies(pkg) {
                let Some(dep_node) = nodes.get(&dep_name) else {
                    continue;
                };

                let spec = match spec.strip_prefix("link:") {
                    Some(rest) => format!("file:{}", rest),
                    None => spec,
                };
                let (spec, is_workspace) = match spec.strip_prefix("workspace:") {
                    Some(rest) => (expand_workspace_alias(rest, dep_node), true),
                    None => (spec, false),
                };

                let resolved = ResolvedSpec::resolve(&spec, &pkg.location);
                if resolved.matches(dep_node) {
                    debug!(dependent = %pkg.name, dependency = %dep_name, spec = %spec, "local dependency linked");
                    if let Some(node) = nodes.get_mut(&dep_name) {
                        node.add_dependent(&pkg.name);
                    }
                } else if is_workspace {
                    return Err(GraphError::WorkspaceResolution {
                        name: dep_name,
                        spec,
                    }
                    .into());
                }
            }
        }

        Ok(Self { nodes, order })
    }

    /// Get a node by name
    pub fn get(&self, name: &str) -> Option<&PackageNode> {
        self.nodes.get(name)
    }

    /// Whether the graph holds a package
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Nodes in package order
    pub fn nodes(&self) -> impl Iterator<Item = &PackageNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Package names in package order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Local dependents of a package
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or_default()
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn check_duplicate_names(packages: &[Package]) -> Result<()> {
    let mut seen: Vec<(&str, Vec<PathBuf>)> = Vec::new();
    for pkg in packages {
        match seen.iter_mut().find(|(name, _)| *name == pkg.name) {
            Some((_, locations)) => locations.push(pkg.location.clone()),
            None => seen.push((&pkg.name, vec![pkg.location.clone()])),
        }
    }

    match seen.into_iter().find(|(_, locations)| locations.len() > 1) {
        Some((name, locations)) => Err(GraphError::DuplicatePackageName {
            name: name.to_string(),
            locations,
        }
        .into()),
        None => Ok(()),
    }
}

/// devDependencies, then optionalDependencies, then dependencies, later entries winning
fn merged_dependencies(pkg: &Package) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::new();
    for kind in DependencyKind::GRAPH {
        for (name, spec) in pkg.dependencies(kind) {
            match merged.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = spec,
                None => merged.push((name, spec)),
            }
        }
    }
    merged
}

fn expand_workspace_alias(spec: &str, dep_node: &PackageNode) -> String {
    match spec {
        "*" | "^" | "~" if dep_node.version.is_empty() => "*".to_string(),
        "*" => dep_node.version.clone(),
        "^" | "~" => format!("{}{}", spec, dep_node.version),
        other => other.to_string(),
    }
}
