//! Version bump across the workspace

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::{validate_config, PluginConfig};
use crate::error::{AggregateError, Result};
use crate::manifest::JsonFile;
use crate::monorepo::{
    load_packages, rewrite_dependencies, ChangeDetector, DependencyGraph, Package, RangeChange,
    UpdateReason, UpdateSet,
};
use crate::session::ReleaseSession;
use crate::types::ReleaseContext;

use super::{base_path, root_package, Collaborators};

/// Name of the lerna configuration file
pub const LERNA_FILE: &str = "lerna.json";

/// What the prepare step changed on disk
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrepareReport {
    /// Version written
    pub version: String,
    /// Why packages were selected, `None` when nothing was inspected
    pub reason: Option<UpdateReason>,
    /// Packages whose version was bumped, root excluded
    pub bumped: Vec<String>,
    /// Dependency ranges rewritten, keyed by the package holding them
    pub range_changes: Vec<(String, RangeChange)>,
    /// lerna.json received the new version
    pub lerna_updated: bool,
    /// The root package.json received the new version
    pub root_bumped: bool,
}

/// Packages that need a release for the version of `ctx`
pub fn changed_packages(
    config: &PluginConfig,
    ctx: &ReleaseContext,
    collaborators: Collaborators<'_>,
) -> Result<(Vec<Package>, UpdateSet)> {
    let packages = load_packages(&ctx.cwd)?;
    let graph = DependencyGraph::build(&packages)?;
    debug!(packages = graph.len(), "built dependency graph");

    let updates = ChangeDetector::new(collaborators.vcs, &ctx.cwd)
        .with_ignore_changes(&config.ignore_changes)?
        .with_exclude_dependents(config.exclude_dependents)
        .collect_updates(&graph, &ctx.next_release.version, config.latch())?;

    Ok((packages, updates))
}

/// Write the release version to changed packages, lerna.json and the root package
#[instrument(skip_all, fields(version = %ctx.next_release.version))]
pub fn prepare(
    config: &PluginConfig,
    ctx: &ReleaseContext,
    session: &mut ReleaseSession,
    collaborators: Collaborators<'_>,
) -> Result<PrepareReport> {
    let mut errors = AggregateError::new();
    if !session.verified {
        errors.extend(validate_config(config));
    }
    if config.npm_verify_auth {
        let result = root_package(config, ctx)
            .and_then(|root| collaborators.auth.verify_auth(session, &root, ctx));
        if let Err(e) = result {
            errors.push(e);
        }
    }
    errors.into_result()?;

    let version = ctx.next_release.version.as_str();
    let base = base_path(config, ctx);
    let npmrc = session.npmrc_path()?;
    let mut report = PrepareReport {
        version: version.to_string(),
        ..Default::default()
    };

    let (packages, updates) = changed_packages(config, ctx, collaborators)?;
    report.reason = Some(updates.reason);

    if updates.packages.is_empty() {
        info!("No packages changed, applying version bump on root package only");
        report.lerna_updated = update_lerna_json(&base, version)?;
        let mut root = root_package(config, ctx)?;
        write_version(&mut root, version);
        root.save()?;
        collaborators.lockfiles.sync_lock_version(&root.location, version)?;
        report.root_bumped = true;
        return Ok(report);
    }

    let s = if updates.packages.len() > 1 { "s" } else { "" };
    info!(
        "{} package{} need version bump: {:?}",
        updates.packages.len(),
        s,
        updates.packages
    );

    let mut changed: Vec<Package> = packages
        .into_iter()
        .filter(|p| updates.packages.contains(&p.name))
        .collect();
    changed.sort_by_key(|p| updates.packages.iter().position(|n| *n == p.name));

    let current_versions: BTreeMap<String, String> = changed
        .iter()
        .map(|p| (p.name.clone(), p.version().to_string()))
        .collect();

    for pkg in &mut changed {
        write_version(pkg, version);
        collaborators.lockfiles.sync_lock_version(&pkg.location, version)?;
        let changes = rewrite_dependencies(pkg, version, &current_versions);
        pkg.save()?;

        report.bumped.push(pkg.name.clone());
        report
            .range_changes
            .extend(changes.into_iter().map(|c| (pkg.name.clone(), c)));
    }

    report.lerna_updated = update_lerna_json(&base, version)?;

    if config.root_version {
        let mut root = root_package(config, ctx)?;
        write_version(&mut root, version);
        let changes = rewrite_dependencies(&mut root, version, &current_versions);
        root.save()?;
        collaborators.lockfiles.sync_lock_version(&root.location, version)?;
        report
            .range_changes
            .extend(changes.into_iter().map(|c| (root.name.clone(), c)));
        report.root_bumped = true;

        collaborators.lockfiles.update_lockfile(&root.location, &npmrc, ctx)?;
    } else {
        info!("Don't write version to root package.json");
    }

    Ok(report)
}

fn write_version(pkg: &mut Package, version: &str) {
    info!(
        "Write version {} to package.json in {}",
        version,
        pkg.location.display()
    );
    pkg.set_version(version);
}

/// Set `version` in lerna.json of `base`, returning whether the file exists
pub fn update_lerna_json(base: &Path, version: &str) -> Result<bool> {
    let path = base.join(LERNA_FILE);
    if !path.exists() {
        debug!(path = %path.display(), "no lerna.json to update");
        return Ok(false);
    }

    info!("Write version {} to lerna.json in {}", version, base.display());
    let mut lerna = JsonFile::load(&path)?;
    lerna.set_str("version", version);
    lerna.save()?;
    Ok(true)
}
