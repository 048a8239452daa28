//! Tests for `toposort`/`getcycle`/`isdag` (P3) and the cycle-detection
//! scenario from spec §8.

#[path = "support.rs"]
mod support;

use std::collections::HashSet;

use dagfuse::{deps::all_dependencies_set, getcycle, isdag, toposort};
use support::{graph, inc, k};

// ============================================================================
// Scenario 7: getcycle({x:(inc,'z'), y:(inc,'x'), z:(inc,'y')}, 'x')
// ============================================================================

#[test]
fn scenario_getcycle_finds_a_permutation_of_the_cycle() {
    let g = graph(vec![
        ("x", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("z")])),
        ("y", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("x")])),
        ("z", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("y")])),
    ]);
    let deps = all_dependencies_set(&g);

    let cycle = getcycle(&g, &deps).expect("graph has a 3-cycle");
    let found: HashSet<_> = cycle.iter().cloned().collect();
    let expected: HashSet<_> = [k("x"), k("y"), k("z")].into_iter().collect();
    assert_eq!(found, expected);
    assert_eq!(cycle.first(), cycle.last());
}

#[test]
fn scenario_isdag_is_false_for_the_cyclic_graph() {
    let g = graph(vec![
        ("x", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("z")])),
        ("y", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("x")])),
        ("z", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("y")])),
    ]);
    let deps = all_dependencies_set(&g);
    assert!(!isdag(&g, &deps));
}

// ============================================================================
// P3: toposort is a permutation of keys(G) respecting every edge
// ============================================================================

#[test]
fn p3_toposort_respects_every_edge() {
    let g = graph(vec![
        ("a", dagfuse::Value::int(1)),
        ("b", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("a")])),
        ("c", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("b")])),
        ("d", dagfuse::Value::task(inc(), vec![dagfuse::Value::key_ref("a")])),
    ]);
    let deps = all_dependencies_set(&g);

    let order = toposort(&g, &deps).unwrap();

    let keys: HashSet<_> = g.keys().cloned().collect();
    let ordered: HashSet<_> = order.iter().cloned().collect();
    assert_eq!(keys, ordered, "toposort must be a permutation of keys(G)");

    let position: std::collections::HashMap<_, _> =
        order.iter().enumerate().map(|(i, key)| (key.clone(), i)).collect();
    for (key, ds) in &deps {
        for d in ds {
            assert!(
                position[d] < position[key],
                "dependency {d:?} of {key:?} must precede it"
            );
        }
    }

    assert!(isdag(&g, &deps));
}
