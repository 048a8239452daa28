//! The one-shot evaluator (SPEC_FULL.md §4.1, C4): `_execute_task` and
//! `get`. Used as a library primitive and as the engine behind
//! `SubgraphCallable::call`.

use std::collections::HashMap;

use crate::deps::all_dependencies_set;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::key::Key;
use crate::toposort::toposort;
use crate::value::Value;

/// Resolves `value` against `cache`: lists map element-wise, tasks
/// recursively evaluate arguments then apply the function, a `KeyRef`
/// resolves to its cached result if present (otherwise passes through
/// unresolved), and a `Quoted` value is returned verbatim without
/// recursing into its payload.
pub fn execute_task(value: &Value, cache: &HashMap<Key, Value>) -> Result<Value, GraphError> {
    match value {
        Value::Literal(_) => Ok(value.clone()),
        Value::Quoted(inner) => Ok((**inner).clone()),
        Value::KeyRef(k) => Ok(cache.get(k).cloned().unwrap_or_else(|| value.clone())),
        Value::List(items) => {
            let evaluated = items
                .iter()
                .map(|v| execute_task(v, cache))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::List(evaluated))
        }
        Value::Task(func, args) => {
            let evaluated_args = args
                .iter()
                .map(|v| execute_task(v, cache))
                .collect::<Result<Vec<_>, _>>()?;
            (func.call)(&evaluated_args)
        }
    }
}

/// Computes every key in `outs`, filling `cache` in topological order over
/// `graph`. Any key already present in `cache` on entry is treated as a
/// pre-supplied input and is not re-evaluated — this is how
/// `SubgraphCallable` binds its `inkeys`.
///
/// Raises `GraphError::MissingKey` if any requested output is absent from
/// `graph` and not already in `cache`.
pub fn get_many(
    graph: &Graph,
    outs: &[Key],
    mut cache: HashMap<Key, Value>,
) -> Result<Vec<Value>, GraphError> {
    for k in outs {
        if !graph.contains_key(k) && !cache.contains_key(k) {
            return Err(GraphError::MissingKey(k.clone()));
        }
    }

    let dependencies = all_dependencies_set(graph);
    let order = toposort(graph, &dependencies)?;

    for key in order {
        if cache.contains_key(&key) {
            continue;
        }
        let value = graph
            .get(&key)
            .expect("toposort only yields keys present in graph");
        let result = execute_task(value, &cache)?;
        cache.insert(key, result);
    }

    outs.iter()
        .map(|k| {
            cache
                .get(k)
                .cloned()
                .ok_or_else(|| GraphError::MissingKey(k.clone()))
        })
        .collect()
}

/// Computes a single output key.
pub fn get(graph: &Graph, out: &Key, cache: HashMap<Key, Value>) -> Result<Value, GraphError> {
    get_many(graph, std::slice::from_ref(out), cache).map(|mut v| v.remove(0))
}
