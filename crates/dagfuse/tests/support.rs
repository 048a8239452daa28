//! Shared fixture helpers for the integration tests in this directory.
//!
//! Not a test file itself — included via `#[path = "support.rs"] mod
//! support;` at the top of each test file that needs it, since Rust
//! integration tests are separate crates and cannot `use` one another
//! directly.

#![allow(dead_code)]

use std::collections::HashMap;

use dagfuse::{Func, Graph, Key, Value};

pub fn inc() -> Func {
    Func::new("inc", |args| match args {
        [Value::Literal(dagfuse::Lit::Int(n))] => Ok(Value::int(n + 1)),
        _ => Err(unexpected_args()),
    })
}

pub fn double() -> Func {
    Func::new("double", |args| match args {
        [Value::Literal(dagfuse::Lit::Int(n))] => Ok(Value::int(n * 2)),
        _ => Err(unexpected_args()),
    })
}

pub fn add() -> Func {
    Func::new("add", |args| match args {
        [Value::Literal(dagfuse::Lit::Int(a)), Value::Literal(dagfuse::Lit::Int(b))] => {
            Ok(Value::int(a + b))
        }
        _ => Err(unexpected_args()),
    })
}

fn unexpected_args() -> dagfuse::GraphError {
    dagfuse::GraphError::ArityMismatch {
        expected: 1,
        got: 0,
    }
}

pub fn graph(entries: Vec<(&str, Value)>) -> Graph {
    entries
        .into_iter()
        .map(|(k, v)| (Key::str(k), v))
        .collect::<HashMap<_, _>>()
}

pub fn k(name: &str) -> Key {
    Key::str(name)
}
