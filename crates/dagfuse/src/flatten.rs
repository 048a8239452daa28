//! Flattening of nested key structures (SPEC_FULL.md §4.1, `flatten`).
//!
//! Callers often pass "one key, or a list of keys, or a list of lists of
//! keys" where a container boundary should be transparent but an individual
//! key is always a leaf. `KeySeq` models exactly that shape.

use crate::key::Key;

/// A possibly-nested collection of keys, as accepted by `cull`/`fuse`/
/// `fuse_linear`'s `keys` argument.
#[derive(Debug, Clone)]
pub enum KeySeq {
    One(Key),
    Many(Vec<KeySeq>),
}

impl From<Key> for KeySeq {
    fn from(k: Key) -> Self {
        KeySeq::One(k)
    }
}

impl From<Vec<Key>> for KeySeq {
    fn from(ks: Vec<Key>) -> Self {
        KeySeq::Many(ks.into_iter().map(KeySeq::One).collect())
    }
}

/// Yields the leaves of an arbitrarily nested `KeySeq`, in traversal order.
pub fn flatten(seq: &KeySeq) -> Vec<Key> {
    let mut out = Vec::new();
    flatten_into(seq, &mut out);
    out
}

fn flatten_into(seq: &KeySeq, out: &mut Vec<Key>) {
    match seq {
        KeySeq::One(k) => out.push(k.clone()),
        KeySeq::Many(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
    }
}
