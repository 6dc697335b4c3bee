//! Monorepo support for multi-package repositories
//!
//! This module provides:
//! - Workspace glob resolution and package loading
//! - Dependency graph construction over local dependency ranges
//! - Change detection based on git diffs since the last release tag
//! - Latching of all packages on coarse-grained version bumps
//! - Propagation of releases to dependent packages
//! - Rewriting of local dependency ranges after a bump

pub mod changes;
pub mod dependents;
pub mod graph;
pub mod latch;
pub mod package;
pub mod ranges;
pub mod workspace;

pub use changes::{ChangeDetector, ChangeFilter, UpdateReason, UpdateSet};
pub use dependents::{collect_dependents, collect_packages, CollectOptions};
pub use graph::{DependencyGraph, PackageNode, ResolvedSpec};
pub use latch::{should_latch, Latch};
pub use package::{DependencyKind, Package, MANIFEST_FILE};
pub use ranges::{bump_range, rewrite_dependencies, RangeChange, RangeShape};
pub use workspace::{load_packages, normalize_path, GlobSource, Workspace};
