//! Topological sort (SPEC_FULL.md §4.3): an iterative, Tarjan-style DFS
//! producing either a total order or a detected cycle.
//!
//! Shaped after the explicit-stack iterative traversal in
//! `graph/algorithms.rs::topological_sort` from the pattern-graph crate this
//! workspace started from, adapted to the "seen vs completed" cycle
//! reconstruction dask's `_toposort` uses: a node enters `seen` on first
//! visit and `completed` once every dependency has been finalized;
//! re-encountering a `seen`-but-not-`completed` node is a back-edge.

use std::collections::HashSet;

use crate::error::GraphError;
use crate::graph::{DependenciesSet, Graph};
use crate::key::Key;

/// Returns the keys of `graph` in topological order (dependencies before
/// dependents), or `GraphError::CycleDetected` if the dependency relation is
/// not acyclic.
///
/// Iteration order within a node's dependency set is unspecified, matching
/// SPEC_FULL.md §4.3.
pub fn toposort(graph: &Graph, dependencies: &DependenciesSet) -> Result<Vec<Key>, GraphError> {
    match run(graph, dependencies) {
        Run::Order(order) => Ok(order),
        Run::Cycle(cycle) => Err(GraphError::CycleDetected { cycle }),
    }
}

/// Returns the first cycle found in `graph`, or `None` if it is acyclic.
pub fn getcycle(graph: &Graph, dependencies: &DependenciesSet) -> Option<Vec<Key>> {
    match run(graph, dependencies) {
        Run::Order(_) => None,
        Run::Cycle(cycle) => Some(cycle),
    }
}

/// `true` iff `graph` has no cycle under the dependency relation.
pub fn isdag(graph: &Graph, dependencies: &DependenciesSet) -> bool {
    getcycle(graph, dependencies).is_none()
}

enum Run {
    Order(Vec<Key>),
    Cycle(Vec<Key>),
}

fn run(graph: &Graph, dependencies: &DependenciesSet) -> Run {
    let mut seen: HashSet<Key> = HashSet::new();
    let mut completed: HashSet<Key> = HashSet::new();
    let mut ordered: Vec<Key> = Vec::new();

    let empty_set: HashSet<Key> = HashSet::new();

    for start in graph.keys() {
        if completed.contains(start) {
            continue;
        }
        let mut stack: Vec<Key> = vec![start.clone()];
        while let Some(cur) = stack.last().cloned() {
            if completed.contains(&cur) {
                stack.pop();
                continue;
            }
            seen.insert(cur.clone());

            let pending: Vec<Key> = dependencies
                .get(&cur)
                .unwrap_or(&empty_set)
                .iter()
                .filter(|d| !completed.contains(*d))
                .cloned()
                .collect();

            if pending.is_empty() {
                completed.insert(cur.clone());
                seen.remove(&cur);
                stack.pop();
                ordered.push(cur);
                continue;
            }

            if let Some(back) = pending.iter().find(|d| seen.contains(*d)) {
                let mut cycle = vec![back.clone()];
                while stack.last() != Some(back) {
                    cycle.push(stack.pop().expect("back-edge target must be on stack"));
                }
                cycle.push(stack.pop().expect("back-edge target must be on stack"));
                cycle.reverse();
                return Run::Cycle(cycle);
            }

            stack.extend(pending);
        }
    }

    Run::Order(ordered)
}
