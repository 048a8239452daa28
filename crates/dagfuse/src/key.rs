//! `Key`: the polymorphic node identifier.
//!
//! Keys are either bare strings or tuples whose head is a string "base name"
//! and whose tail carries positional coordinates (e.g. a chunk index for a
//! partitioned computation). Modeled as an explicit sum type with derived
//! equality, ordering, and hashing rather than leaning on ambient
//! polymorphism over arbitrary hashable values.

use std::fmt;
use std::sync::Arc;

/// A coordinate inside a tuple key, e.g. the `0` in `("sum-abc", 0)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Coord {
    Int(i64),
    Str(Arc<str>),
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coord::Int(n) => write!(f, "{n}"),
            Coord::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A node identifier: either a bare string or a tuple of `(base_name,
/// coordinates...)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Str(Arc<str>),
    Tuple(Arc<str>, Vec<Coord>),
}

impl Key {
    /// Constructs a bare string key.
    pub fn str(name: impl Into<Arc<str>>) -> Self {
        Key::Str(name.into())
    }

    /// Constructs a tuple key from a base name and coordinates.
    pub fn tuple(name: impl Into<Arc<str>>, coords: Vec<Coord>) -> Self {
        Key::Tuple(name.into(), coords)
    }

    /// The base name: the whole string for `Str`, or the head for `Tuple`.
    pub fn base_name(&self) -> &str {
        match self {
            Key::Str(s) => s,
            Key::Tuple(s, _) => s,
        }
    }

    /// Rebuilds this key with a new base name, keeping any coordinates.
    pub fn with_base_name(&self, new_name: impl Into<Arc<str>>) -> Key {
        match self {
            Key::Str(_) => Key::Str(new_name.into()),
            Key::Tuple(_, coords) => Key::Tuple(new_name.into(), coords.clone()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{s}"),
            Key::Tuple(s, coords) => {
                write!(f, "({s}")?;
                for c in coords {
                    write!(f, ", {c}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::str(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::str(s)
    }
}
