//! Tests for `cull`: transitive-closure restriction (P2) and the concrete
//! scenario from spec §8.

#[path = "support.rs"]
mod support;

use std::collections::{HashMap, HashSet};

use dagfuse::{cull, Key, KeySeq, Value};
use support::{add, graph, inc, k};

// ============================================================================
// Scenario 1: cull({x:1, y:(inc,'x'), out:(add,'x',10)}, 'out')
// ============================================================================

#[test]
fn scenario_cull_drops_unreachable_y() {
    let g = graph(vec![
        ("x", Value::int(1)),
        ("y", Value::task(inc(), vec![Value::key_ref("x")])),
        (
            "out",
            Value::task(add(), vec![Value::key_ref("x"), Value::int(10)]),
        ),
    ]);

    let (culled, deps) = cull(&g, &KeySeq::One(k("out"))).unwrap();

    assert_eq!(culled.len(), 2);
    assert!(culled.contains_key(&k("out")));
    assert!(culled.contains_key(&k("x")));
    assert!(!culled.contains_key(&k("y")));

    assert_eq!(deps.get(&k("out")).unwrap(), &vec![k("x")]);
    assert_eq!(deps.get(&k("x")).unwrap(), &Vec::<Key>::new());
}

// ============================================================================
// P2: every surviving key is reachable from some output key
// ============================================================================

#[test]
fn p2_every_surviving_key_is_reachable_from_outputs() {
    let g = graph(vec![
        ("a", Value::int(1)),
        ("b", Value::task(inc(), vec![Value::key_ref("a")])),
        ("c", Value::task(inc(), vec![Value::key_ref("b")])),
        ("unrelated", Value::int(99)),
    ]);

    let (culled, _) = cull(&g, &KeySeq::One(k("c"))).unwrap();

    let expected: HashSet<Key> = [k("a"), k("b"), k("c")].into_iter().collect();
    let actual: HashSet<Key> = culled.keys().cloned().collect();
    assert_eq!(actual, expected);
}

#[test]
fn cull_missing_key_errors() {
    let g: HashMap<Key, Value> = HashMap::new();
    let err = cull(&g, &KeySeq::One(k("missing"))).unwrap_err();
    assert_eq!(err, dagfuse::GraphError::MissingKey(k("missing")));
}
