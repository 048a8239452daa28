//! Dependency extraction and reverse-dependency maps (SPEC_FULL.md §4.2).

use std::collections::{HashMap, HashSet};

use crate::graph::{DependenciesList, DependenciesSet, Graph};
use crate::key::Key;
use crate::value::Value;

/// Collects the keys referenced transitively inside `value`, in traversal
/// order with multiplicity preserved. Only `KeyRef`s that are actually
/// present in `graph` count as dependencies — an unresolved reference is an
/// external input, not a graph edge. A `Quoted` value is an opaque leaf and
/// contributes nothing.
pub fn dependencies_of_value(graph: &Graph, value: &Value) -> Vec<Key> {
    let mut out = Vec::new();
    collect(graph, value, &mut out);
    out
}

fn collect(graph: &Graph, value: &Value, out: &mut Vec<Key>) {
    match value {
        Value::Literal(_) | Value::Quoted(_) => {}
        Value::KeyRef(k) => {
            if graph.contains_key(k) {
                out.push(k.clone());
            }
        }
        Value::List(items) => {
            for item in items {
                collect(graph, item, out);
            }
        }
        Value::Task(_, args) => {
            for arg in args {
                collect(graph, arg, out);
            }
        }
    }
}

/// Dependencies of a key already bound in `graph`, as a list preserving
/// multiplicity.
pub fn dependencies_of_key(graph: &Graph, key: &Key) -> Vec<Key> {
    match graph.get(key) {
        Some(value) => dependencies_of_value(graph, value),
        None => Vec::new(),
    }
}

/// Dependencies of a key, deduplicated.
pub fn dependencies_of_key_set(graph: &Graph, key: &Key) -> HashSet<Key> {
    dependencies_of_key(graph, key).into_iter().collect()
}

/// Builds `{key: [deps]}` for every key in `graph`.
pub fn all_dependencies_list(graph: &Graph) -> DependenciesList {
    graph
        .keys()
        .map(|k| (k.clone(), dependencies_of_key(graph, k)))
        .collect()
}

/// Builds `{key: {deps}}` for every key in `graph`.
pub fn all_dependencies_set(graph: &Graph) -> DependenciesSet {
    graph
        .keys()
        .map(|k| (k.clone(), dependencies_of_key_set(graph, k)))
        .collect()
}

/// Reverses a dependency map: `{v: {k | v ∈ deps[k]}}`.
///
/// Every key that appears as a dependency anywhere is guaranteed to be
/// present in the result, even with an empty dependent set, matching dask's
/// `reverse_dict` (built on a `defaultdict(set)`).
pub fn reverse_dict(deps: &DependenciesSet) -> DependenciesSet {
    let mut rdeps: DependenciesSet = HashMap::new();
    for k in deps.keys() {
        rdeps.entry(k.clone()).or_default();
    }
    for (k, vals) in deps {
        for v in vals {
            rdeps.entry(v.clone()).or_default().insert(k.clone());
        }
    }
    rdeps
}
