//! Task-graph culling, inlining, and fusion.
//!
//! A task graph is a [`Graph`]: a mapping from [`Key`] to [`Value`], where a
//! `Value` is either a literal, a reference to another key, a list, or a
//! `Task` — a [`Func`] applied to arguments that may themselves nest tasks,
//! lists, key references, or literals. The operations in this crate all
//! transform or evaluate such a graph:
//!
//! - [`cull`] restricts a graph to the transitive closure of a set of
//!   output keys.
//! - [`inline`]/[`inline_functions`] substitute selected keys' values
//!   directly into their dependents, then leave removal to `cull`.
//! - [`fuse_linear`] collapses maximal one-in-one-out chains of tasks into
//!   single tasks.
//! - [`fuse`] is the general reduction-aware fusion pass: it merges
//!   branching subtrees too, subject to width/height/new-edge heuristics
//!   that keep individual fused tasks from growing unboundedly.
//! - [`subgraph::inplace_fuse_subgraphs`] takes fusion one step further,
//!   collapsing a fused chain into an executable [`SubgraphCallable`] so a
//!   scheduler can hand a whole chain to one worker.
//! - [`get`] evaluates a graph directly, without any optimization pass,
//!   useful both as a reference semantics and as the engine behind
//!   `SubgraphCallable::call`.
//! - [`toposort`]/[`getcycle`]/[`isdag`] expose the dependency-ordering
//!   machinery every other operation in this crate is built on.

pub mod cull;
pub mod deps;
pub mod error;
pub mod eval;
pub mod flatten;
pub mod fuse;
pub mod fuse_linear;
pub mod graph;
pub mod inline;
pub mod key;
pub mod rename;
pub mod subgraph;
pub mod subs;
pub mod toposort;
pub mod value;

pub use crate::cull::cull;
pub use crate::error::GraphError;
pub use crate::eval::{execute_task, get, get_many};
pub use crate::flatten::{flatten, KeySeq};
pub use crate::fuse::{fuse, FuseOptions};
pub use crate::fuse_linear::fuse_linear;
pub use crate::graph::{DependenciesList, DependenciesSet, Graph};
pub use crate::inline::{functions_of, inline, inline_functions};
pub use crate::key::{Coord, Key};
pub use crate::rename::{key_split, RenameKeys};
pub use crate::subgraph::SubgraphCallable;
pub use crate::subs::subs;
pub use crate::toposort::{getcycle, isdag, toposort};
pub use crate::value::{quote, Func, Lit, Value};
