//! Tests for `inline` and `inline_functions`, and the two concrete
//! scenarios from spec §8.

#[path = "support.rs"]
mod support;

use std::collections::HashSet;

use dagfuse::{inline, inline_functions, Value};
use support::{add, double, graph, inc, k};

// ============================================================================
// Scenario 5: inline({x:1, y:(inc,'x'), z:(add,'x','y')})
// ============================================================================

#[test]
fn scenario_inline_substitutes_constants_by_default() {
    let g = graph(vec![
        ("x", Value::int(1)),
        ("y", Value::task(inc(), vec![Value::key_ref("x")])),
        (
            "z",
            Value::task(add(), vec![Value::key_ref("x"), Value::key_ref("y")]),
        ),
    ]);

    let result = inline(&g, HashSet::new(), true, None);

    assert_eq!(
        result.get(&k("y")).unwrap(),
        &Value::task(inc(), vec![Value::int(1)])
    );
    assert_eq!(
        result.get(&k("z")).unwrap(),
        &Value::task(add(), vec![Value::int(1), Value::key_ref("y")])
    );
    // inline never removes keys; cull does that.
    assert!(result.contains_key(&k("x")));
    assert!(result.contains_key(&k("y")));
}

// ============================================================================
// Scenario 6: inline_functions(dsk, ['i','out'], [inc,double]) inlines
// `double` only; `i` is protected by membership in `output`.
// ============================================================================

#[test]
fn scenario_inline_functions_inlines_only_the_unprotected_fast_task() {
    let g = graph(vec![
        ("a", Value::int(1)),
        ("i", Value::task(inc(), vec![Value::key_ref("a")])),
        ("d", Value::task(double(), vec![Value::key_ref("a")])),
        (
            "out",
            Value::task(add(), vec![Value::key_ref("i"), Value::key_ref("d")]),
        ),
    ]);

    let output: HashSet<_> = [k("i"), k("out")].into_iter().collect();
    let fast_functions: HashSet<_> = [
        dagfuse::Func::new("inc", |_| unreachable!()).name,
        dagfuse::Func::new("double", |_| unreachable!()).name,
    ]
    .into_iter()
    .collect();

    let result = inline_functions(&g, &output, &fast_functions, false, None);

    assert!(!result.contains_key(&k("d")), "d must be removed after inlining");
    assert!(result.contains_key(&k("i")), "i is protected by `output`");
    assert_eq!(
        result.get(&k("out")).unwrap(),
        &Value::task(
            add(),
            vec![Value::key_ref("i"), Value::task(double(), vec![Value::key_ref("a")])]
        )
    );
}

#[test]
fn inline_functions_is_a_no_op_with_no_fast_functions() {
    let g = graph(vec![("a", Value::int(1))]);
    let result = inline_functions(&g, &HashSet::new(), &HashSet::new(), false, None);
    assert_eq!(result, g);
}
