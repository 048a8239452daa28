//! `SubgraphCallable` and `_inplace_fuse_subgraphs` (SPEC_FULL.md §4.8, C9):
//! collapse a maximal linear chain of single-dependency, single-dependent
//! tasks into one opaque callable, so a single worker can execute the whole
//! chain without round-tripping through the scheduler between steps.
//!
//! The chain-finding pass here is the same `child2parent`/`unfusible`
//! work-list construction as `fuse_linear` (see that module), restricted to
//! keys with more than one executable task so a chain of length one is
//! never collapsed into a callable for nothing.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::GraphError;
use crate::eval::get;
use crate::graph::Graph;
use crate::key::Key;
use crate::rename::{default_fused_keys_renamer, key_split};
use crate::value::{Func, Value};

/// An executable fragment of a graph, callable with one argument per
/// `inkeys` entry. Equality and hashing follow the distilled source's
/// `SubgraphCallable.__eq__`/`__hash__`: two callables are equal when their
/// `name` and `outkey` match and their `inkeys` match as sets (argument
/// order does not distinguish them).
#[derive(Clone)]
pub struct SubgraphCallable {
    pub dsk: Arc<Graph>,
    pub outkey: Key,
    pub inkeys: Vec<Key>,
    pub name: Arc<str>,
}

impl SubgraphCallable {
    pub fn new(dsk: Graph, outkey: Key, inkeys: Vec<Key>) -> Self {
        SubgraphCallable {
            dsk: Arc::new(dsk),
            outkey,
            inkeys,
            name: Arc::from("subgraph_callable"),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, GraphError> {
        if args.len() != self.inkeys.len() {
            return Err(GraphError::ArityMismatch {
                expected: self.inkeys.len(),
                got: args.len(),
            });
        }
        let cache: HashMap<Key, Value> = self
            .inkeys
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        get(&self.dsk, &self.outkey, cache)
    }

    /// Wraps this callable as a `Func`, usable as a task's function slot.
    /// The `Func`'s own identity (used for `fast_functions` membership
    /// elsewhere) is keyed on `outkey` rather than the constant
    /// `"subgraph_callable"` name carried on the struct itself, so distinct
    /// fused chains are never mistaken for the same function.
    pub fn into_func(self) -> Func {
        let identity: Arc<str> = Arc::from(format!("subgraph_callable:{}", self.outkey));
        Func::new(identity, move |args| self.call(args))
    }
}

impl fmt::Debug for SubgraphCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq for SubgraphCallable {
    fn eq(&self, other: &Self) -> bool {
        let inkeys_self: HashSet<&Key> = self.inkeys.iter().collect();
        let inkeys_other: HashSet<&Key> = other.inkeys.iter().collect();
        self.name == other.name && self.outkey == other.outkey && inkeys_self == inkeys_other
    }
}

impl Eq for SubgraphCallable {}

impl std::hash::Hash for SubgraphCallable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.outkey.hash(state);
        let mut sorted: Vec<&Key> = self.inkeys.iter().collect();
        sorted.sort();
        for k in sorted {
            k.hash(state);
        }
    }
}

/// Mutates `rv`/`dependencies`/`fused_trees` in place, folding maximal
/// linear chains (excluding keys in `keys`) into `SubgraphCallable` tasks. A
/// chain is only fused when it contains at least two executable tasks.
pub fn inplace_fuse_subgraphs(
    rv: &mut Graph,
    keys: Option<&HashSet<Key>>,
    dependencies: &mut HashMap<Key, HashSet<Key>>,
    fused_trees: &mut HashMap<Key, Vec<Key>>,
    rename_keys: bool,
) {
    let mut child2parent: HashMap<Key, Key> = HashMap::new();
    let mut unfusible: HashSet<Key> = HashSet::new();
    for parent in rv.keys() {
        let deps = dependencies.get(parent).cloned().unwrap_or_default();
        let has_many_children = deps.len() > 1;
        for child in &deps {
            if keys.is_some_and(|k| k.contains(child)) {
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

        let ntasks = chain
            .iter()
            .filter(|k| rv.get(*k).map(|v| v.is_task()).unwrap_or(false))
            .count();
        if ntasks > 1 {
            chains.push(chain);
        }
    }

    for chain in chains {
        let outkey = chain[0].clone();
        let leaf = chain.last().expect("chain is never empty").clone();

        let subgraph: Graph = chain
            .iter()
            .map(|k| {
                (
                    k.clone(),
                    rv.get(k).expect("chain members come from rv").clone(),
                )
            })
            .collect();

        let leaf_deps = dependencies.get(&leaf).cloned().unwrap_or_default();
        for k in &chain[1..] {
            dependencies.remove(k);
            rv.remove(k);
        }
        dependencies.insert(outkey.clone(), leaf_deps.clone());

        let inkeys: Vec<Key> = leaf_deps.into_iter().collect();
        let callable = SubgraphCallable::new(subgraph, outkey.clone(), inkeys.clone());
        let args: Vec<Value> = inkeys.into_iter().map(Value::KeyRef).collect();
        rv.insert(outkey.clone(), Value::Task(callable.into_func(), args));

        if rename_keys {
            let mut chain2: Vec<Key> = Vec::new();
            for k in &chain {
                match fused_trees.remove(k) {
                    Some(subchain) => chain2.extend(subchain),
                    None => chain2.push(k.clone()),
                }
            }
            fused_trees.insert(outkey, chain2);
        }
    }
}

/// Names a fused subgraph's output key for display purposes the way `fuse`
/// would have named it, without mutating `fused_trees`. Exposed for callers
/// that want a human-readable label for a `SubgraphCallable`'s `outkey`.
pub fn subgraph_display_name(fused_keys: &[Key]) -> String {
    fused_keys
        .last()
        .map(key_split)
        .or_else(|| default_fused_keys_renamer(fused_keys, None).map(|k| k.to_string()))
        .unwrap_or_default()
}
