//! `cull` (SPEC_FULL.md §4.4, C5): restrict a graph to the transitive
//! closure of a set of target keys.

use std::collections::{HashMap, HashSet};

use crate::deps::dependencies_of_key;
use crate::error::GraphError;
use crate::flatten::{flatten, KeySeq};
use crate::graph::{DependenciesList, Graph};

/// Returns `(culled graph, dependencies)` containing exactly the keys
/// reachable from `keys` under the dependency relation. `dependencies` maps
/// each surviving key to its dependency *list* (multiplicity preserved),
/// which `fuse_linear` needs.
///
/// Errors with `GraphError::MissingKey` if a reachable key is not bound in
/// `graph`.
pub fn cull(
    graph: &Graph,
    keys: &KeySeq,
) -> Result<(Graph, DependenciesList), GraphError> {
    let targets: HashSet<_> = flatten(keys).into_iter().collect();

    let mut seen: HashSet<_> = HashSet::new();
    let mut dependencies: DependenciesList = HashMap::new();
    let mut out: Graph = HashMap::new();
    let mut work: Vec<_> = targets.into_iter().collect();

    while !work.is_empty() {
        let mut new_work = Vec::new();
        for k in &work {
            let value = graph
                .get(k)
                .ok_or_else(|| GraphError::MissingKey(k.clone()))?;
            let deps_k = dependencies_of_key(graph, k);
            out.insert(k.clone(), value.clone());
            for d in &deps_k {
                if !seen.contains(d) {
                    seen.insert(d.clone());
                    new_work.push(d.clone());
                }
            }
            dependencies.insert(k.clone(), deps_k);
        }
        work = new_work;
    }

    Ok((out, dependencies))
}
