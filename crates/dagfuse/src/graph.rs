//! The graph itself: a mapping from keys to values, plus the two
//! dependency-map representations used across the optimizer.

use std::collections::{HashMap, HashSet};

use crate::key::Key;
use crate::value::Value;

/// A task graph: every key's defining value.
pub type Graph = HashMap<Key, Value>;

/// `{key: [deps]}`, preserving multiplicity. Required by `fuse_linear` and
/// `cull` (SPEC_FULL.md §4.4, §4.6).
pub type DependenciesList = HashMap<Key, Vec<Key>>;

/// `{key: {deps}}`, deduplicated. Used everywhere else.
pub type DependenciesSet = HashMap<Key, HashSet<Key>>;

/// Converts a list-form dependency map into set form.
pub fn to_set_form(deps: &DependenciesList) -> DependenciesSet {
    deps.iter()
        .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
        .collect()
}
