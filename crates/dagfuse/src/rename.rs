//! Key renamers (SPEC_FULL.md §4.9, C10): `key_split` and the two default
//! fused-key name constructors used by `fuse_linear` and `fuse`.

use std::collections::BTreeSet;

use crate::key::Key;

/// A renaming strategy for fused keys, as accepted by `fuse_linear`/`fuse`.
///
/// Modeled as an explicit enum rather than a dynamically-typed
/// bool-or-callable (SPEC_FULL.md §4, `fuse`'s `rename_keys`): a value of
/// this type can never be the "neither boolean nor callable" case
/// `spec.md` §7 lists as an error, so that error variant does not exist
/// here.
#[derive(Clone)]
pub enum RenameKeys {
    /// Use the operation's default renamer.
    Default,
    /// Keep the surviving root key; do not rename.
    Disabled,
    /// A caller-supplied renamer: `new_key = renamer(fused_key_list)`.
    Custom(std::sync::Arc<dyn Fn(&[Key]) -> Option<Key> + Send + Sync>),
}

/// Returns the portion of a key's base name before the first run of
/// trailing digits or a `#`-separated suffix.
///
/// Approximates dask's `key_split` (an external helper imported from
/// `dask.utils`, not included in the distilled `task.py`/`optimization.py`
/// source) to the level of detail `spec.md`'s GLOSSARY describes it at: the
/// human-readable "base name" portion of a generated key, trimming
/// partition/chunk-index suffixes.
pub fn key_split(key: &Key) -> String {
    let base = key.base_name();
    let head = base.split('#').next().unwrap_or(base);

    let words: Vec<&str> = head.split('-').collect();
    let mut result = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            result.push_str(word);
        } else if !word.is_empty() && word.chars().all(|c| c.is_alphabetic()) {
            result.push('-');
            result.push_str(word);
        } else {
            break;
        }
    }
    while result.ends_with(|c: char| c.is_ascii_digit()) {
        result.pop();
    }
    if result.is_empty() {
        head.to_string()
    } else {
        result
    }
}

/// `fuse_linear`'s default renamer. `chain` is ordered root (surviving key)
/// first, most-descendant last.
pub fn default_fused_linear_keys_renamer(chain: &[Key]) -> Option<Key> {
    let root = chain.first()?;
    let mut names: Vec<String> = chain[1..].iter().rev().map(key_split).collect();
    match root {
        Key::Str(_) => {
            names.push(root.to_string());
            Some(Key::Str(names.join("-").into()))
        }
        Key::Tuple(_, coords) => {
            names.push(root.base_name().to_string());
            Some(Key::Tuple(names.join("-").into(), coords.clone()))
        }
    }
}

/// A small stable hash, used only to produce the 4-hex-digit disambiguation
/// suffix in `default_fused_keys_renamer` when a name must be truncated.
/// Any deterministic hash works here; the suffix exists to make
/// independently truncated long names unlikely to collide, not to provide
/// cryptographic guarantees.
fn stable_hash(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn enforce_max_key_length(name: String, max_fused_key_length: Option<usize>) -> String {
    match max_fused_key_length {
        Some(limit) if limit > 0 && name.len() > limit => {
            let hex = format!("{:x}", stable_hash(&name));
            let suffix = &hex[..hex.len().min(4)];
            let truncated: String = name.chars().take(limit).collect();
            format!("{truncated}-{suffix}")
        }
        _ => name,
    }
}

/// `fuse`'s default renamer. `fused_keys` is the absorbed-key list recorded
/// during traversal, with the surviving root key appended last.
/// `max_fused_key_length` (default 120 per SPEC_FULL.md §4.7) bounds the
/// resulting name's length, accounting for the hash suffix.
pub fn default_fused_keys_renamer(
    fused_keys: &[Key],
    max_fused_key_length: Option<usize>,
) -> Option<Key> {
    let first_key = fused_keys.last()?;
    let rest = &fused_keys[..fused_keys.len() - 1];

    let limit = max_fused_key_length.map(|m| m.saturating_sub(5));

    let first_name = key_split(first_key);
    let mut names: BTreeSet<String> = rest.iter().map(key_split).collect();
    names.remove(&first_name);
    let mut names: Vec<String> = names.into_iter().collect();

    match first_key {
        Key::Str(_) => {
            names.push(first_key.to_string());
            let concatenated = names.join("-");
            Some(Key::Str(enforce_max_key_length(concatenated, limit).into()))
        }
        Key::Tuple(_, coords) => {
            names.push(first_key.base_name().to_string());
            let concatenated = names.join("-");
            Some(Key::Tuple(
                enforce_max_key_length(concatenated, limit).into(),
                coords.clone(),
            ))
        }
    }
}
