//! Tests for `SubgraphCallable` and `fuse`'s `fuse_subgraphs` pass: the
//! round-trip property (P6) and scenario 8 from spec §8.

#[path = "support.rs"]
mod support;

use dagfuse::{fuse, FuseOptions, KeySeq, RenameKeys, SubgraphCallable, Value};
use support::{graph, inc, k};

// ============================================================================
// P6: calling a SubgraphCallable reproduces the pre-fusion evaluation
// ============================================================================

#[test]
fn p6_subgraph_callable_round_trips_a_two_step_chain() {
    let inner = graph(vec![
        ("b", Value::task(inc(), vec![Value::key_ref("x")])),
        ("c", Value::task(inc(), vec![Value::key_ref("b")])),
    ]);
    let callable = SubgraphCallable::new(inner, k("c"), vec![k("x")]);

    let result = callable.call(&[Value::int(10)]).unwrap();
    assert_eq!(result, Value::int(12), "inc(inc(10)) == 12");
}

#[test]
fn subgraph_callable_rejects_the_wrong_number_of_arguments() {
    let inner = graph(vec![("c", Value::task(inc(), vec![Value::key_ref("x")]))]);
    let callable = SubgraphCallable::new(inner, k("c"), vec![k("x")]);

    let err = callable.call(&[]).unwrap_err();
    assert_eq!(
        err,
        dagfuse::GraphError::ArityMismatch { expected: 1, got: 0 }
    );
}

#[test]
fn subgraph_callable_equality_ignores_inkey_order() {
    let inner = graph(vec![("c", Value::int(1))]);
    let a = SubgraphCallable::new(inner.clone(), k("c"), vec![k("x"), k("y")]);
    let b = SubgraphCallable::new(inner, k("c"), vec![k("y"), k("x")]);
    assert_eq!(a, b);
}

// ============================================================================
// Scenario 8: fuse(..., fuse_subgraphs=true) on a protected-input chain of
// two true tasks replaces the chain root with a SubgraphCallable task.
// ============================================================================

#[test]
fn scenario_fuse_subgraphs_collapses_a_chain_behind_a_callable() {
    let g = graph(vec![
        ("x", Value::int(10)),
        ("b", Value::task(inc(), vec![Value::key_ref("x")])),
        ("c", Value::task(inc(), vec![Value::key_ref("b")])),
    ]);
    let protected = KeySeq::One(k("x"));
    let options = FuseOptions {
        ave_width: 0.5,
        fuse_subgraphs: true,
        rename_keys: RenameKeys::Disabled,
        ..FuseOptions::default()
    };

    let (rv, _deps) = fuse(&g, Some(&protected), None, options);

    assert_eq!(rv.len(), 2);
    assert_eq!(rv.get(&k("x")).unwrap(), &Value::int(10));
    assert!(!rv.contains_key(&k("b")), "b is absorbed into the callable's inner graph");

    let callable_value = rv.get(&k("c")).expect("root key c survives as the callable's task");
    let Value::Task(func, args) = callable_value else {
        panic!("expected c to be bound to a callable task");
    };
    assert_eq!(args, &vec![Value::key_ref("x")]);

    let result = (func.call)(&[Value::int(10)]).unwrap();
    assert_eq!(result, Value::int(12), "calling it with x's value reproduces inc(inc(x))");
}
