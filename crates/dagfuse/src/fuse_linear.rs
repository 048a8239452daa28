//! `fuse_linear` (SPEC_FULL.md §4.6, C7): collapse maximal linear chains of
//! single-dependency, single-dependent tasks into one task each.
//!
//! Superseded in expressive power by `fuse` (§4.7), but kept as a cheaper
//! pass and because its alias-retention behavior differs from `fuse`'s (see
//! the Open Question in DESIGN.md).

use std::collections::{HashMap, HashSet};

use crate::deps::all_dependencies_list;
use crate::flatten::{flatten, KeySeq};
use crate::graph::{DependenciesList, DependenciesSet, Graph};
use crate::key::Key;
use crate::rename::{default_fused_linear_keys_renamer, RenameKeys};
use crate::subs::subs;
use crate::value::Value;

/// Returns `(graph, {k: set(deps)})` with every maximal linear chain
/// collapsed into a single task.
///
/// `keys`, when provided, both protects those keys from being folded into a
/// chain's interior and (per the Open Question this crate inherited from
/// its source, documented in DESIGN.md) determines whether alias entries
/// left behind by renaming are pruned at the end.
pub fn fuse_linear(
    graph: &Graph,
    keys: Option<&KeySeq>,
    dependencies: Option<&DependenciesList>,
    rename_keys: RenameKeys,
) -> (Graph, DependenciesSet) {
    let protected_keys: Option<HashSet<Key>> = keys.map(|k| flatten(k).into_iter().collect());

    let owned_deps_list;
    let dependencies_list: &DependenciesList = match dependencies {
        Some(d) => d,
        None => {
            owned_deps_list = all_dependencies_list(graph);
            &owned_deps_list
        }
    };

    // Locate all members of linear chains.
    let mut child2parent: HashMap<Key, Key> = HashMap::new();
    let mut unfusible: HashSet<Key> = HashSet::new();
    for (parent, deps) in dependencies_list {
        let has_many_children = deps.len() > 1;
        for child in deps {
            if protected_keys.as_ref().is_some_and(|p| p.contains(child)) {
                unfusible.insert(child.clone());
            } else if child2parent.contains_key(child) {
                child2parent.remove(child);
                unfusible.insert(child.clone());
            } else if has_many_children {
                unfusible.insert(child.clone());
            } else if !unfusible.contains(child) {
                child2parent.insert(child.clone(), parent.clone());
            }
        }
    }

    // Construct the chains from ancestor to descendant.
    let mut parent2child: HashMap<Key, Key> = child2parent
        .iter()
        .map(|(c, p)| (p.clone(), c.clone()))
        .collect();
    let mut chains: Vec<Vec<Key>> = Vec::new();
    while let Some((child0, parent0)) = child2parent
        .iter()
        .next()
        .map(|(c, p)| (c.clone(), p.clone()))
    {
        child2parent.remove(&child0);
        let mut chain = vec![child0.clone(), parent0.clone()];
        let mut parent = parent0;
        while let Some(next_parent) = child2parent.get(&parent).cloned() {
            child2parent.remove(&parent);
            parent2child.remove(&next_parent);
            chain.push(next_parent.clone());
            parent = next_parent;
        }
        chain.reverse();
        let mut child = child0;
        while let Some(next_child) = parent2child.get(&child).cloned() {
            parent2child.remove(&child);
            child2parent.remove(&next_child);
            chain.push(next_child.clone());
            child = next_child;
        }
        chains.push(chain);
    }

    let mut dependencies: DependenciesSet = dependencies_list
        .iter()
        .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
        .collect();

    let key_renamer: Option<Box<dyn Fn(&[Key]) -> Option<Key>>> = match rename_keys {
        RenameKeys::Default => Some(Box::new(default_fused_linear_keys_renamer)),
        RenameKeys::Disabled => None,
        RenameKeys::Custom(f) => Some(Box::new(move |chain: &[Key]| f(chain))),
    };

    let mut rv: Graph = HashMap::new();
    let mut fused: HashSet<Key> = HashSet::new();
    let mut aliases: HashSet<Key> = HashSet::new();

    for mut chain in chains {
        let mut is_renamed = false;
        let mut new_key: Option<Key> = None;
        if let Some(renamer) = &key_renamer {
            if let Some(nk) = renamer(&chain) {
                if !graph.contains_key(&nk) && !rv.contains_key(&nk) {
                    new_key = Some(nk);
                    is_renamed = true;
                }
            }
        }

        let mut child = chain.pop().expect("chain is never empty");
        let mut val = graph
            .get(&child)
            .expect("chain members come from the graph")
            .clone();
        while let Some(parent) = chain.pop() {
            let child_deps = dependencies.remove(&child).unwrap_or_default();
            let parent_deps = dependencies.entry(parent.clone()).or_default();
            parent_deps.extend(child_deps);
            parent_deps.remove(&child);
            val = subs(
                graph.get(&parent).expect("chain members come from the graph"),
                &child,
                &val,
            );
            fused.insert(child.clone());
            child = parent;
        }
        fused.insert(child.clone());

        if is_renamed {
            let nk = new_key.expect("is_renamed implies new_key is set");
            rv.insert(nk.clone(), val);
            rv.insert(child.clone(), Value::KeyRef(nk.clone()));
            let child_deps = dependencies.remove(&child).unwrap_or_default();
            dependencies.insert(nk.clone(), child_deps);
            dependencies.insert(child.clone(), HashSet::from([nk]));
            aliases.insert(child);
        } else {
            rv.insert(child, val);
        }
    }

    for (key, val) in graph {
        if !fused.contains(key) {
            rv.insert(key.clone(), val.clone());
        }
    }

    if !aliases.is_empty() {
        let mut rewrites: Vec<(Key, Key)> = Vec::new();
        for (key, deps) in dependencies.iter() {
            for old_key in deps.iter() {
                if aliases.contains(old_key) {
                    rewrites.push((key.clone(), old_key.clone()));
                }
            }
        }
        for (key, old_key) in rewrites {
            let new_key = match rv.get(&old_key) {
                Some(Value::KeyRef(nk)) => nk.clone(),
                _ => continue,
            };
            if let Some(deps) = dependencies.get_mut(&key) {
                deps.remove(&old_key);
                deps.insert(new_key.clone());
            }
            if let Some(val) = rv.get(&key).cloned() {
                rv.insert(key, subs(&val, &old_key, &Value::KeyRef(new_key)));
            }
        }

        if let Some(protected) = &protected_keys {
            for alias_key in &aliases {
                if !protected.contains(alias_key) {
                    rv.remove(alias_key);
                    dependencies.remove(alias_key);
                }
            }
        }
    }

    (rv, dependencies)
}
