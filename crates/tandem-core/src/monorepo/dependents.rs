//! Propagation of releases to dependent packages

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::error::Result;

use super::graph::{DependencyGraph, PackageNode};

/// Packages that must be released because they depend on one of `candidates`.
///
/// Each candidate runs its own breadth-first walk over the dependents
/// relation with a private visited set. A dependent is skipped when it is the
/// starting candidate or when the node being expanded lists the starting
/// candidate among its own dependents, which cuts cycles back to the start.
/// Skipped nodes still count as visited for the rest of that walk.
pub fn collect_dependents(graph: &DependencyGraph, candidates: &[String]) -> HashSet<String> {
    let mut collected = HashSet::new();

    for current in candidates {
        if graph.dependents_of(current).is_empty() {
            continue;
        }

        let mut queue: VecDeque<&str> = VecDeque::from([current.as_str()]);
        let mut seen: HashSet<&str> = HashSet::new();

        while let Some(name) = queue.pop_front() {
            let siblings = graph.dependents_of(name);
            for dependent in siblings {
                if !seen.insert(dependent.as_str()) {
                    continue;
                }
                if dependent == current || siblings.iter().any(|s| s == current) {
                    debug!(candidate = %current, dependent = %dependent, "skipping cyclic dependent");
                    continue;
                }
                collected.insert(dependent.clone());
                queue.push_back(dependent.as_str());
            }
        }
    }

    collected
}

/// Options for [`collect_packages`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    /// Do not add dependents of the candidates
    pub exclude_dependents: bool,
}

/// Select candidate packages and, unless excluded, their dependents.
///
/// The result always follows the graph's package order.
pub fn collect_packages<F>(
    graph: &DependencyGraph,
    mut is_candidate: F,
    options: CollectOptions,
) -> Result<Vec<String>>
where
    F: FnMut(&PackageNode) -> Result<bool>,
{
    let mut candidates: Vec<String> = Vec::new();
    for node in graph.nodes() {
        if is_candidate(node)? {
            candidates.push(node.name.clone());
        }
    }

    let mut selected: HashSet<String> = candidates.iter().cloned().collect();
    if !options.exclude_dependents {
        selected.extend(collect_dependents(graph, &candidates));
    }

    Ok(graph
        .names()
        .iter()
        .filter(|name| selected.contains(*name))
        .cloned()
        .collect())
}

/// Every package of the graph, in package order
pub fn collect_all(graph: &DependencyGraph) -> Vec<String> {
    graph.names().to_vec()
}
