//! `subs` (SPEC_FULL.md §4.1, C1): recursive substitution of one key by a
//! value inside a task tree.
//!
//! dask's `subs` goes to some trouble to match only same-typed, exactly-equal
//! occurrences of `key`, because in a dynamically typed graph a plain value
//! can coincidentally compare equal to a key of a different kind. The
//! explicit `Value::KeyRef` tag makes that ambiguity impossible here: a key
//! occurrence is always tagged, so substitution is a direct structural
//! recursion with no type-identity dance required.

use crate::key::Key;
use crate::value::Value;

/// Returns a value identical to `value` except that every `KeyRef(key)`
/// occurrence is replaced by `replacement`. Recurses into task arguments
/// (never the function slot) and list elements. A `Quoted` payload is
/// opaque and is returned unchanged, uninspected.
pub fn subs(value: &Value, key: &Key, replacement: &Value) -> Value {
    match value {
        Value::KeyRef(k) if k == key => replacement.clone(),
        Value::KeyRef(_) | Value::Literal(_) | Value::Quoted(_) => value.clone(),
        Value::List(items) => Value::List(items.iter().map(|v| subs(v, key, replacement)).collect()),
        Value::Task(func, args) => Value::Task(
            func.clone(),
            args.iter().map(|v| subs(v, key, replacement)).collect(),
        ),
    }
}
