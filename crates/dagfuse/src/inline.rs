//! `inline` and `inline_functions` (SPEC_FULL.md §4.5, C6).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::deps::{all_dependencies_set, reverse_dict};
use crate::graph::{DependenciesSet, Graph};
use crate::key::Key;
use crate::subs::subs;
use crate::toposort::toposort;
use crate::value::Value;

/// Substitutes every occurrence of each key in `keys` with its defining
/// value. When `inline_constants` is set, the effective key set additionally
/// includes aliases (keys bound to another key already in the graph) and
/// keys whose value is a non-task with no dependencies.
///
/// Inlined keys are **not** removed from the returned graph; follow with
/// `cull` to drop them (matching dask's documented contract).
///
/// Substitutions are computed in a single pass over a full topological
/// order of `graph`: for every key (not only the ones in `keys`), each
/// occurrence of an inlined dependency is replaced by that dependency's own
/// already-resolved value. Because dependencies are visited before their
/// dependents, chained inlining (`a` depends on inlined `b`, which itself
/// depended on inlined `c`) resolves correctly in one pass. This computes
/// the same result as dask's two-pass `inline` (a restricted-toposort pass
/// over `keys`'s transitive closure, followed by a single-level pass over
/// the rest of the graph) without needing the restricted subgraph: the
/// per-key formula is identical either way, so running it uniformly over
/// every key is just a simpler way to reach the same fixed point.
pub fn inline(
    graph: &Graph,
    mut keys: HashSet<Key>,
    inline_constants: bool,
    dependencies: Option<&DependenciesSet>,
) -> Graph {
    let owned_deps;
    let dependencies: &DependenciesSet = match dependencies {
        Some(d) => d,
        None => {
            owned_deps = all_dependencies_set(graph);
            &owned_deps
        }
    };

    if inline_constants {
        for (k, v) in graph {
            let is_alias = matches!(v, Value::KeyRef(kr) if graph.contains_key(kr));
            let is_dep_free_non_task =
                !v.is_task() && dependencies.get(k).map(|d| d.is_empty()).unwrap_or(true);
            if is_alias || is_dep_free_non_task {
                keys.insert(k.clone());
            }
        }
    }

    let order = toposort(graph, dependencies).unwrap_or_default();

    let mut keysubs: HashMap<Key, Value> = HashMap::new();
    for key in order {
        let mut val = graph.get(&key).expect("toposort key must be in graph").clone();
        if let Some(deps_k) = dependencies.get(&key) {
            for dep in deps_k.iter().filter(|d| keys.contains(*d)) {
                let replacement = keysubs
                    .get(dep)
                    .cloned()
                    .unwrap_or_else(|| graph.get(dep).expect("dependency must be in graph").clone());
                val = subs(&val, dep, &replacement);
            }
        }
        keysubs.insert(key, val);
    }

    keysubs
}

/// Collects the identity (`Func::root_identity`) of every function
/// appearing anywhere inside a nested task, stripping partial-application
/// wrappers. Only `Task` and `List` values are recursed into — a scalar
/// leaf (literal, key reference, quoted payload) contributes nothing.
pub fn functions_of(value: &Value) -> HashSet<Arc<str>> {
    let mut funcs = HashSet::new();
    let mut work = vec![value];
    while let Some(v) = work.pop() {
        match v {
            Value::Task(func, args) => {
                funcs.insert(func.root_identity().clone());
                work.extend(args.iter());
            }
            Value::List(items) => work.extend(items.iter()),
            Value::Literal(_) | Value::KeyRef(_) | Value::Quoted(_) => {}
        }
    }
    funcs
}

/// Inlines and removes every key whose value is a task built entirely out
/// of `fast_functions`, that has at least one dependent, and that is not in
/// `output`.
pub fn inline_functions(
    graph: &Graph,
    output: &HashSet<Key>,
    fast_functions: &HashSet<Arc<str>>,
    inline_constants: bool,
    dependencies: Option<&DependenciesSet>,
) -> Graph {
    if fast_functions.is_empty() {
        return graph.clone();
    }

    let owned_deps;
    let dependencies: &DependenciesSet = match dependencies {
        Some(d) => d,
        None => {
            owned_deps = all_dependencies_set(graph);
            &owned_deps
        }
    };
    let dependents = reverse_dict(dependencies);

    let inlinable = |v: &Value| functions_of(v).is_subset(fast_functions);

    let keys: HashSet<Key> = graph
        .iter()
        .filter(|(k, v)| {
            v.is_task()
                && dependents.get(*k).map(|d| !d.is_empty()).unwrap_or(false)
                && !output.contains(*k)
                && inlinable(v)
        })
        .map(|(k, _)| k.clone())
        .collect();

    if keys.is_empty() {
        return graph.clone();
    }

    let mut result = inline(graph, keys.clone(), inline_constants, Some(dependencies));
    for k in &keys {
        result.remove(k);
    }
    result
}
