//! Rewriting of local dependency ranges after a version bump

use std::collections::BTreeMap;

use node_semver::{Range, Version};
use serde::Serialize;
use tracing::debug;

use super::package::{DependencyKind, Package};

/// Syntactic shape of a declared range relative to the dependency's current version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeShape {
    /// `1.2.3`
    Exact,
    /// `^1.2.3`
    CaretMajorMinorPatch,
    /// `^1.2`
    CaretMajorMinor,
    /// `^1`
    CaretMajor,
    /// Any other valid semver range
    Arbitrary,
    /// Not a semver range (tags, URLs, paths, protocols)
    Unparseable,
}

impl RangeShape {
    /// Classify `range` against the dependency's current version
    pub fn classify(range: &str, current: &Version) -> Self {
        let current_str = current.to_string();
        if range == current_str {
            Self::Exact
        } else if range == format!("^{}", current_str) {
            Self::CaretMajorMinorPatch
        } else if range == format!("^{}.{}", current.major, current.minor) {
            Self::CaretMajorMinor
        } else if range == format!("^{}", current.major) {
            Self::CaretMajor
        } else if Range::parse(range).is_ok() {
            Self::Arbitrary
        } else {
            Self::Unparseable
        }
    }
}

/// A range that was rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeChange {
    pub kind: DependencyKind,
    pub name: String,
    pub from: String,
    pub to: String,
}

/// New range for `range` when its dependency moves from `current` to `new_version`.
///
/// Returns `None` when the range should stay as declared.
pub fn bump_range(range: &str, current: &str, new_version: &Version) -> Option<String> {
    let current = Version::parse(current).ok()?;

    match RangeShape::classify(range, &current) {
        RangeShape::Exact => Some(new_version.to_string()),
        RangeShape::CaretMajorMinorPatch => Some(format!("^{}", new_version)),
        RangeShape::CaretMajorMinor => {
            Some(format!("^{}.{}", new_version.major, new_version.minor))
        }
        RangeShape::CaretMajor => Some(format!("^{}", new_version.major)),
        RangeShape::Arbitrary => {
            let parsed = Range::parse(range).ok()?;
            if parsed.satisfies(new_version) {
                return None;
            }
            let hat = if range.starts_with('^') { "^" } else { "" };
            let components = range.matches('.').count() + 1;
            let replacement = [new_version.major, new_version.minor, new_version.patch]
                .iter()
                .take(components)
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(".");
            Some(format!("{}{}", hat, replacement))
        }
        RangeShape::Unparseable => None,
    }
}

/// Rewrite one dependency mapping of `pkg` in place
pub fn bump_dependencies(
    pkg: &mut Package,
    kind: DependencyKind,
    new_version: &Version,
    current_versions: &BTreeMap<String, String>,
) -> Vec<RangeChange> {
    let mut changes = Vec::new();

    for (name, range) in pkg.dependencies(kind) {
        let Some(current) = current_versions.get(&name).filter(|v| !v.is_empty()) else {
            continue;
        };
        let Some(to) = bump_range(&range, current, new_version) else {
            continue;
        };
        if to == range {
            continue;
        }

        debug!(package = %pkg.name, dependency = %name, kind = %kind, from = %range, to = %to, "rewriting dependency range");
        pkg.set_dependency(kind, &name, &to);
        changes.push(RangeChange {
            kind,
            name,
            from: range,
            to,
        });
    }

    changes
}

/// Rewrite dependencies, devDependencies and peerDependencies of `pkg`
/// for packages moving from the versions in `current_versions` to `new_version`
pub fn rewrite_dependencies(
    pkg: &mut Package,
    new_version: &str,
    current_versions: &BTreeMap<String, String>,
) -> Vec<RangeChange> {
    let Ok(new_version) = Version::parse(new_version) else {
        return Vec::new();
    };

    DependencyKind::REWRITTEN
        .iter()
        .flat_map(|kind| bump_dependencies(pkg, *kind, &new_version, current_versions))
        .collect()
}
