//! `Value`: the right-hand side bound to a key, and `Func`, the callable
//! identity used inside `Task` values.
//!
//! A value's "is it a task, a list, a literal, or a key reference?" question
//! is answered by an explicit tag rather than by runtime shape inspection
//! (see SPEC_FULL.md §9, "Tagged variants").

use std::fmt;
use std::sync::Arc;

use crate::error::GraphError;
use crate::key::Key;

/// A scalar payload: the leaves of a task tree that are not key references.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Bool(bool),
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Int(n) => write!(f, "{n}"),
            Lit::Float(x) => write!(f, "{x}"),
            Lit::Str(s) => write!(f, "{s:?}"),
            Lit::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A named, hashable callable.
///
/// `name` is the identity used by equality, hashing, and `fast_functions`
/// membership tests — not the closure itself. This mirrors a dask task's
/// function slot being identified by the underlying Python function object
/// (its `__name__`/identity), never by behavioral comparison.
#[derive(Clone)]
pub struct Func {
    pub name: Arc<str>,
    pub call: Arc<dyn Fn(&[Value]) -> Result<Value, GraphError> + Send + Sync>,
    /// Set when this `Func` is a partial application wrapping another
    /// `Func`; mirrors dask's `.func`-chasing `unwrap_partial`.
    pub wrapped: Option<Arc<Func>>,
}

impl Func {
    pub fn new(
        name: impl Into<Arc<str>>,
        call: impl Fn(&[Value]) -> Result<Value, GraphError> + Send + Sync + 'static,
    ) -> Self {
        Func {
            name: name.into(),
            call: Arc::new(call),
            wrapped: None,
        }
    }

    /// Wraps this function as a partial application of `inner`, for the
    /// `functions_of`/`unwrap_partial` chain (SPEC_FULL.md §9).
    pub fn wrapping(name: impl Into<Arc<str>>, inner: Arc<Func>, call: Arc<dyn Fn(&[Value]) -> Result<Value, GraphError> + Send + Sync>) -> Self {
        Func {
            name: name.into(),
            call,
            wrapped: Some(inner),
        }
    }

    /// Follows the `wrapped` chain to its fixed point, returning the
    /// identity of the innermost non-partial function.
    pub fn root_identity(&self) -> &Arc<str> {
        let mut cur = self;
        while let Some(inner) = &cur.wrapped {
            cur = inner;
        }
        &cur.name
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func").field("name", &self.name).finish()
    }
}

impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Func {}

impl std::hash::Hash for Func {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// The right-hand side bound to a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A scalar payload.
    Literal(Lit),
    /// A bare key occurring as a value, forming an alias.
    KeyRef(Key),
    /// An ordered sequence of values, traversed transparently.
    List(Vec<Value>),
    /// A callable applied to arguments that may themselves be tasks, lists,
    /// key references, or literals.
    Task(Func, Vec<Value>),
    /// An opaque payload that must never be traversed, even though it may
    /// structurally resemble a `Task` or `List`. Produced by `quote`.
    Quoted(Box<Value>),
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Literal(Lit::Int(n))
    }

    pub fn str_lit(s: impl Into<Arc<str>>) -> Self {
        Value::Literal(Lit::Str(s.into()))
    }

    pub fn key_ref(k: impl Into<Key>) -> Self {
        Value::KeyRef(k.into())
    }

    pub fn task(func: Func, args: Vec<Value>) -> Self {
        Value::Task(func, args)
    }

    /// True iff this value is a `Task` (a callable applied to arguments).
    ///
    /// Corresponds to dask's `istask`; here the tag does the work instead of
    /// a tuple/callable runtime check. A `Quoted` value is never a task,
    /// even if its payload is.
    pub fn is_task(&self) -> bool {
        matches!(self, Value::Task(..))
    }
}

/// Wraps `v` so that it is treated as an opaque leaf by every traversal in
/// this crate, protecting it from being misread as task/list structure.
///
/// Corresponds to dask's `literal`/`quote` (see SPEC_FULL.md §3). Only
/// `Task` and `List` values need protection; anything else already behaves
/// as a leaf and is returned unchanged.
pub fn quote(v: Value) -> Value {
    match &v {
        Value::Task(..) | Value::List(..) => Value::Quoted(Box::new(v)),
        _ => v,
    }
}
