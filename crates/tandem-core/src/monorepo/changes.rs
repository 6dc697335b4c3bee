//! Change detection for monorepos

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collaborators::VersionControl;
use crate::error::{ConfigError, Result};

use super::dependents::{collect_all, collect_packages, CollectOptions};
use super::graph::{DependencyGraph, PackageNode};
use super::latch::Latch;
use super::workspace::normalize_path;

/// Filter removing changed files that should not trigger a release
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    patterns: Vec<String>,
    ignore: GlobSet,
}

impl Default for ChangeFilter {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            ignore: GlobSet::empty(),
        }
    }
}

impl ChangeFilter {
    /// Build a filter from ignore globs
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "ignoreChanges".to_string(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        let ignore = builder.build().map_err(|e| ConfigError::InvalidValue {
            field: "ignoreChanges".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            patterns: patterns.to_vec(),
            ignore,
        })
    }

    /// Whether no ignore pattern is configured
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a changed file is ignored, matching its full path or its basename
    pub fn is_ignored(&self, file: &str) -> bool {
        if self.ignore.is_match(file) {
            return true;
        }
        Path::new(file)
            .file_name()
            .is_some_and(|name| self.ignore.is_match(name))
    }

    /// Files that are not ignored
    pub fn retain(&self, files: Vec<String>) -> Vec<String> {
        files.into_iter().filter(|f| !self.is_ignored(f)).collect()
    }
}

/// Why a set of packages was selected for release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateReason {
    /// HEAD is the last release; nothing to do
    AlreadyReleased,
    /// The next version latches all packages together
    Latched(Latch),
    /// No release tag exists yet
    NoReleaseTag,
    /// Packages changed since the given tag, plus their dependents
    ChangedSince(String),
}

impl std::fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyReleased => write!(f, "already released"),
            Self::Latched(latch) => write!(f, "latched on {}", latch),
            Self::NoReleaseTag => write!(f, "no release tag"),
            Self::ChangedSince(tag) => write!(f, "changed since {}", tag),
        }
    }
}

/// Packages to release and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSet {
    pub reason: UpdateReason,
    /// Package names in package order
    pub packages: Vec<String>,
}

/// Change detector for monorepos
pub struct ChangeDetector<'a> {
    vcs: &'a dyn VersionControl,
    /// Root path of the workspace
    root: PathBuf,
    filter: ChangeFilter,
    exclude_dependents: bool,
}

impl<'a> ChangeDetector<'a> {
    /// Create a new change detector
    pub fn new(vcs: &'a dyn VersionControl, root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            root: normalize_path(&root.into()),
            filter: ChangeFilter::default(),
            exclude_dependents: false,
        }
    }

    /// Ignore changed files matching these globs
    pub fn with_ignore_changes(mut self, patterns: &[String]) -> Result<Self> {
        self.filter = ChangeFilter::new(patterns)?;
        Ok(self)
    }

    /// Set whether dependents of changed packages are left out
    pub fn with_exclude_dependents(mut self, exclude: bool) -> Self {
        self.exclude_dependents = exclude;
        self
    }

    /// Pathspec restricting a diff to the package, `None` for the workspace root
    fn pathspec<'n>(&self, node: &'n PackageNode) -> Option<&'n Path> {
        let relative = node.location.strip_prefix(&self.root).ok();
        match relative {
            Some(rel) if rel.as_os_str().is_empty() => None,
            _ => Some(node.location.as_path()),
        }
    }

    /// Whether the package has files changed since `committish` that are not ignored
    pub fn has_diff(&self, node: &PackageNode, committish: &str) -> Result<bool> {
        let diff = self.vcs.diff_names(committish, self.pathspec(node))?;
        if diff.is_empty() {
            return Ok(false);
        }

        let changed = self.filter.retain(diff);
        if changed.is_empty() {
            debug!(package = %node.name, "no diff found after filtering");
        } else {
            debug!(package = %node.name, files = ?changed, "filtered diff");
        }
        Ok(!changed.is_empty())
    }

    /// Packages with direct changes since `committish`, in package order
    pub fn detect_changes(&self, graph: &DependencyGraph, committish: &str) -> Result<Vec<String>> {
        let mut changed = Vec::new();
        for node in graph.nodes() {
            if self.has_diff(node, committish)? {
                changed.push(node.name.clone());
            }
        }
        Ok(changed)
    }

    /// Decide which packages to release for `version`
    pub fn collect_updates(
        &self,
        graph: &DependencyGraph,
        version: &str,
        latch: Latch,
    ) -> Result<UpdateSet> {
        let mut committish = None;

        if self.vcs.has_tags()? {
            let describe = self.vcs.describe()?;
            debug!(?describe, "described HEAD");

            if describe.ref_count == 0 {
                warn!("Current HEAD is already released, skipping change detection.");
                return Ok(UpdateSet {
                    reason: UpdateReason::AlreadyReleased,
                    packages: Vec::new(),
                });
            }

            committish = describe.last_tag_name;
        }

        if latch.should_latch(version) {
            info!(
                "Bumping all packages because configuration is set to latch on {} and higher",
                latch
            );
            return Ok(UpdateSet {
                reason: UpdateReason::Latched(latch),
                packages: collect_all(graph),
            });
        }

        let Some(committish) = committish else {
            info!("Failed to find last release tag, assuming all packages changed");
            return Ok(UpdateSet {
                reason: UpdateReason::NoReleaseTag,
                packages: collect_all(graph),
            });
        };

        info!("Looking for changed packages since {}", committish);
        if !self.filter.is_empty() {
            info!(patterns = ?self.filter.patterns, "ignoring diff in paths matching");
        }

        let packages = collect_packages(
            graph,
            |node| self.has_diff(node, &committish),
            CollectOptions {
                exclude_dependents: self.exclude_dependents,
            },
        )?;

        Ok(UpdateSet {
            reason: UpdateReason::ChangedSince(committish),
            packages,
        })
    }
}
