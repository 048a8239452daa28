//! `fuse` (SPEC_FULL.md §4.7, C8): reduction-aware fusion with
//! width/height/new-edge heuristics. The primary complexity of this crate.
//!
//! Ported directly from the traversal structure of the distilled source
//! (`optimization.py::fuse`): two explicit stacks — `children_stack` (keys
//! whose reducible children have not yet been expanded) and `info_stack`
//! (per-subtree fusion metrics) — replace the recursion a naive
//! reduction-tree walk would otherwise need, matching SPEC_FULL.md §4.7's
//! traversal description exactly.

use std::collections::{HashMap, HashSet};

use crate::flatten::{flatten, KeySeq};
use crate::graph::{DependenciesList, DependenciesSet, Graph};
use crate::key::Key;
use crate::rename::{default_fused_keys_renamer, RenameKeys};
use crate::subgraph::inplace_fuse_subgraphs;
use crate::subs::subs;
use crate::value::{Lit, Value};

/// Heuristic parameters for `fuse`. `ave_width` is the natural dial: every
/// other default is derived from it (SPEC_FULL.md §4.7).
#[derive(Clone)]
pub struct FuseOptions {
    pub ave_width: f64,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub max_depth_new_edges: Option<f64>,
    pub rename_keys: RenameKeys,
    pub fuse_subgraphs: bool,
    pub max_fused_key_length: Option<usize>,
}

impl Default for FuseOptions {
    fn default() -> Self {
        FuseOptions {
            ave_width: 1.0,
            max_width: None,
            max_height: None,
            max_depth_new_edges: None,
            rename_keys: RenameKeys::Default,
            fuse_subgraphs: false,
            max_fused_key_length: Some(120),
        }
    }
}

/// Per-subtree fusion metrics tracked on `info_stack`. All numeric fields
/// are `f64` because a rejected-merge path can clamp `width` to a derived
/// float bound (`max_width`) that then flows through later arithmetic
/// alongside integer node/height counts — mirroring the duck-typed int/float
/// mixing in the distilled source's original traversal.
struct Info {
    key: Key,
    task: Value,
    fused_keys: Option<Vec<Key>>,
    height: f64,
    width: f64,
    num_nodes: f64,
    fudge: f64,
    edges: HashSet<Key>,
}

fn is_fusible_leaf_shape(v: &Value) -> bool {
    matches!(
        v,
        Value::Task(..) | Value::Literal(Lit::Int(_)) | Value::Literal(Lit::Float(_)) | Value::Literal(Lit::Str(_))
    )
}

/// Returns `(graph, {k: set(deps)})` with reducible subtrees collapsed into
/// single tasks, per the acceptance rules in SPEC_FULL.md §4.7.
pub fn fuse(
    graph: &Graph,
    keys: Option<&KeySeq>,
    dependencies: Option<&DependenciesList>,
    options: FuseOptions,
) -> (Graph, DependenciesSet) {
    let protected_keys: Option<HashSet<Key>> = keys.map(|k| flatten(k).into_iter().collect());

    let ave_width = options.ave_width;
    let max_height = options
        .max_height
        .unwrap_or(1.5 + ave_width * (ave_width + 1.0).ln());
    let max_depth_new_edges = options.max_depth_new_edges.unwrap_or(ave_width * 1.5);
    let max_width = options
        .max_width
        .unwrap_or(1.5 + ave_width * (ave_width + 1.0).ln());

    let deps_list: DependenciesList = dependencies
        .cloned()
        .unwrap_or_else(|| crate::deps::all_dependencies_list(graph));

    if ave_width == 0.0 || max_height == 0.0 {
        let deps_set: DependenciesSet = deps_list
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect();
        return (graph.clone(), deps_set);
    }

    let rename_enabled = !matches!(options.rename_keys, RenameKeys::Disabled);

    let mut rdeps: HashMap<Key, Vec<Key>> = HashMap::new();
    let mut deps: HashMap<Key, HashSet<Key>> = HashMap::new();
    for (k, vals) in &deps_list {
        for v in vals {
            rdeps.entry(v.clone()).or_default().push(k.clone());
        }
        deps.insert(k.clone(), vals.iter().cloned().collect());
    }

    let mut reducible: HashSet<Key> = rdeps
        .iter()
        .filter(|(_, vals)| vals.len() == 1)
        .map(|(k, _)| k.clone())
        .collect();
    if let Some(p) = &protected_keys {
        for k in p {
            reducible.remove(k);
        }
    }
    for (k, v) in graph.iter() {
        if !is_fusible_leaf_shape(v) {
            reducible.remove(k);
        }
    }

    if reducible.is_empty() {
        let nothing_for_subgraphs = !options.fuse_subgraphs
            || rdeps.values().all(|v| {
                let set: HashSet<&Key> = v.iter().collect();
                set.len() != 1
            });
        if nothing_for_subgraphs {
            return (graph.clone(), deps);
        }
    }

    let mut rv: Graph = graph.clone();
    let mut fused_trees: HashMap<Key, Vec<Key>> = HashMap::new();
    let mut info_stack: Vec<Info> = Vec::new();
    let mut children_stack: Vec<Key> = Vec::new();

    while let Some(start) = reducible.iter().next().cloned() {
        let mut parent = start;
        while reducible.contains(&parent) {
            parent = rdeps
                .get(&parent)
                .and_then(|v| v.first())
                .cloned()
                .expect("a reducible node has exactly one dependent");
        }
        children_stack.push(parent.clone());
        let initial: Vec<Key> = deps
            .get(&parent)
            .map(|d| d.iter().filter(|x| reducible.contains(*x)).cloned().collect())
            .unwrap_or_default();
        children_stack.extend(initial);

        'region: loop {
            let top = children_stack.last().cloned().expect("non-empty region stack");
            if top != parent {
                // Depth-first search down to a leaf of the reducible region.
                let mut cur = top;
                loop {
                    let children: Vec<Key> = deps
                        .get(&cur)
                        .map(|d| d.iter().filter(|x| reducible.contains(*x)).cloned().collect())
                        .unwrap_or_default();
                    if children.is_empty() {
                        break;
                    }
                    children_stack.extend(children);
                    parent = cur.clone();
                    cur = children_stack.last().cloned().unwrap();
                }
                children_stack.pop();
                let leaf = cur;
                let edges: HashSet<Key> = deps
                    .get(&leaf)
                    .cloned()
                    .unwrap_or_default()
                    .difference(&reducible)
                    .cloned()
                    .collect();
                info_stack.push(Info {
                    key: leaf.clone(),
                    task: rv.get(&leaf).cloned().expect("leaf key must be bound"),
                    fused_keys: rename_enabled.then(|| vec![leaf.clone()]),
                    height: 1.0,
                    width: 1.0,
                    num_nodes: 1.0,
                    fudge: 0.0,
                    edges,
                });
            } else {
                children_stack.pop();

                let deps_parent = deps.get(&parent).cloned().unwrap_or_default();
                let edges0: HashSet<Key> = deps_parent.difference(&reducible).cloned().collect();
                let children: HashSet<Key> = deps_parent.difference(&edges0).cloned().collect();
                let num_children = children.len();

                if num_children == 1 {
                    let info = info_stack.pop().expect("single child info expected");
                    let num_children_edges = info.edges.len() as f64;

                    let mut fudge = info.fudge;
                    if num_children_edges - 1.0 >= 0.0 && fudge > num_children_edges - 1.0 {
                        fudge = num_children_edges - 1.0;
                    }
                    let mut edges = edges0.clone();
                    edges.extend(info.edges.iter().cloned());
                    let no_new_edges = edges.len() as f64 == num_children_edges;
                    if !no_new_edges {
                        fudge += 1.0;
                    }

                    let accept = (info.num_nodes + fudge) / info.height <= ave_width
                        && (no_new_edges || info.height < max_depth_new_edges);

                    if accept {
                        let val = subs(
                            graph.get(&parent).expect("parent must be in graph"),
                            &info.key,
                            &info.task,
                        );
                        let mut new_parent_deps = deps.remove(&parent).unwrap_or_default();
                        new_parent_deps.remove(&info.key);
                        let child_remaining = deps.remove(&info.key).unwrap_or_default();
                        new_parent_deps.extend(child_remaining);
                        deps.insert(parent.clone(), new_parent_deps);

                        rv.remove(&info.key);
                        reducible.remove(&info.key);

                        let mut child_keys = info.fused_keys;
                        if rename_enabled {
                            let mut ck = child_keys.unwrap_or_default();
                            ck.push(parent.clone());
                            fused_trees.insert(parent.clone(), ck.clone());
                            fused_trees.remove(&info.key);
                            child_keys = Some(ck);
                        }

                        if !children_stack.is_empty() {
                            let (height, num_nodes) = if no_new_edges {
                                (info.height, info.num_nodes)
                            } else {
                                (info.height + 1.0, info.num_nodes + 1.0)
                            };
                            info_stack.push(Info {
                                key: parent.clone(),
                                task: val,
                                fused_keys: child_keys,
                                height,
                                width: info.width,
                                num_nodes,
                                fudge,
                                edges,
                            });
                        } else {
                            rv.insert(parent.clone(), val);
                            break 'region;
                        }
                    } else {
                        rv.insert(info.key.clone(), info.task);
                        reducible.remove(&info.key);
                        if !children_stack.is_empty() {
                            let ave_minus_1 = (ave_width - 1.0).trunc();
                            let mut fudge2 = fudge;
                            if fudge2 > ave_minus_1 {
                                fudge2 = ave_minus_1;
                            }
                            info_stack.push(Info {
                                key: parent.clone(),
                                task: rv.get(&parent).cloned().expect("parent must be bound"),
                                fused_keys: rename_enabled.then(|| vec![parent.clone()]),
                                height: 1.0,
                                width: info.width,
                                num_nodes: 1.0,
                                fudge: fudge2,
                                edges,
                            });
                        } else {
                            break 'region;
                        }
                    }
                } else {
                    let children_info: Vec<Info> =
                        info_stack.split_off(info_stack.len() - num_children);

                    let mut child_keys_acc: Vec<Key> = Vec::new();
                    let mut height = 1.0f64;
                    let mut width = 0.0f64;
                    let mut num_single_nodes = 0.0f64;
                    let mut num_nodes = 0.0f64;
                    let mut fudge = 0.0f64;
                    let mut children_edges: HashSet<Key> = HashSet::new();
                    let mut max_num_edges = 0.0f64;
                    for info in &children_info {
                        if info.height == 1.0 {
                            num_single_nodes += 1.0;
                        } else if info.height > height {
                            height = info.height;
                        }
                        width += info.width;
                        num_nodes += info.num_nodes;
                        fudge += info.fudge;
                        if info.edges.len() as f64 > max_num_edges {
                            max_num_edges = info.edges.len() as f64;
                        }
                        children_edges.extend(info.edges.iter().cloned());
                    }
                    let num_children_edges = children_edges.len() as f64;
                    fudge += ((num_children as f64) - 1.0).min((num_children_edges - max_num_edges).max(0.0));
                    if num_children_edges - 1.0 >= 0.0 && fudge > num_children_edges - 1.0 {
                        fudge = num_children_edges - 1.0;
                    }
                    let mut edges = edges0.clone();
                    edges.extend(children_edges.iter().cloned());
                    let no_new_edges = edges.len() as f64 == num_children_edges;
                    if !no_new_edges {
                        fudge += 1.0;
                    }

                    let is_width = num_single_nodes <= ave_width && width <= max_width;
                    let is_height =
                        height <= max_height && (no_new_edges || height < max_depth_new_edges);
                    let accept = (num_nodes + fudge) / height <= ave_width && is_width && is_height;

                    if accept {
                        let mut val = graph.get(&parent).expect("parent must be in graph").clone();
                        let mut children_deps: HashSet<Key> = HashSet::new();
                        for info in &children_info {
                            val = subs(&val, &info.key, &info.task);
                            rv.remove(&info.key);
                            children_deps.extend(deps.remove(&info.key).unwrap_or_default());
                            reducible.remove(&info.key);
                            if rename_enabled {
                                fused_trees.remove(&info.key);
                                if let Some(ck) = &info.fused_keys {
                                    child_keys_acc.extend(ck.iter().cloned());
                                }
                            }
                        }
                        let mut parent_deps = deps.remove(&parent).unwrap_or_default();
                        parent_deps = parent_deps.difference(&children).cloned().collect();
                        parent_deps.extend(children_deps);
                        deps.insert(parent.clone(), parent_deps);

                        if rename_enabled {
                            child_keys_acc.push(parent.clone());
                            fused_trees.insert(parent.clone(), child_keys_acc.clone());
                        }

                        if !children_stack.is_empty() {
                            info_stack.push(Info {
                                key: parent.clone(),
                                task: val,
                                fused_keys: rename_enabled.then_some(child_keys_acc),
                                height: height + 1.0,
                                width,
                                num_nodes: num_nodes + 1.0,
                                fudge,
                                edges,
                            });
                        } else {
                            rv.insert(parent.clone(), val);
                            break 'region;
                        }
                    } else {
                        for info in children_info {
                            rv.insert(info.key.clone(), info.task);
                            reducible.remove(&info.key);
                        }
                        if !children_stack.is_empty() {
                            let mut width2 = width;
                            if width2 > max_width {
                                width2 = max_width;
                            }
                            let ave_minus_1 = (ave_width - 1.0).trunc();
                            let mut fudge2 = fudge;
                            if fudge2 > ave_minus_1 {
                                fudge2 = ave_minus_1;
                            }
                            info_stack.push(Info {
                                key: parent.clone(),
                                task: rv.get(&parent).cloned().expect("parent must be bound"),
                                fused_keys: rename_enabled.then(|| vec![parent.clone()]),
                                height: 1.0,
                                width: width2,
                                num_nodes: 1.0,
                                fudge: fudge2,
                                edges,
                            });
                        } else {
                            break 'region;
                        }
                    }
                }
                // Traverse upwards.
                parent = rdeps
                    .get(&parent)
                    .and_then(|v| v.first())
                    .cloned()
                    .unwrap_or(parent);
            }
        }
    }

    if options.fuse_subgraphs {
        inplace_fuse_subgraphs(
            &mut rv,
            protected_keys.as_ref(),
            &mut deps,
            &mut fused_trees,
            rename_enabled,
        );
    }

    if rename_enabled {
        let renamer: Box<dyn Fn(&[Key]) -> Option<Key>> = match &options.rename_keys {
            RenameKeys::Default => {
                let limit = options.max_fused_key_length;
                Box::new(move |fk: &[Key]| default_fused_keys_renamer(fk, limit))
            }
            RenameKeys::Custom(f) => {
                let f = f.clone();
                Box::new(move |fk: &[Key]| f(fk))
            }
            RenameKeys::Disabled => Box::new(|_: &[Key]| None),
        };
        for (root_key, fused_keys) in fused_trees.iter() {
            if let Some(alias) = renamer(fused_keys) {
                if !rv.contains_key(&alias) {
                    let root_val = rv.get(root_key).cloned().expect("root key must be bound");
                    rv.insert(alias.clone(), root_val);
                    rv.insert(root_key.clone(), Value::KeyRef(alias.clone()));
                    let root_deps = deps.remove(root_key).unwrap_or_default();
                    deps.insert(alias.clone(), root_deps);
                    deps.insert(root_key.clone(), HashSet::from([alias]));
                }
            }
        }
    }

    (rv, deps)
}
