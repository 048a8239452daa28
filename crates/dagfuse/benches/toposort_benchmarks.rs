//! Performance benchmarks for `toposort` on wide and deep synthetic graphs.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dagfuse::{deps::all_dependencies_set, toposort, Func, Graph, Key, Value};

fn inc() -> Func {
    Func::new("inc", |args| match args {
        [Value::Literal(dagfuse::Lit::Int(n))] => Ok(Value::int(n + 1)),
        _ => unreachable!(),
    })
}

fn create_deep_chain(depth: usize) -> Graph {
    let mut g: Graph = HashMap::new();
    g.insert(Key::str("n0"), Value::int(0));
    for i in 1..=depth {
        g.insert(
            Key::str(format!("n{i}")),
            Value::task(inc(), vec![Value::key_ref(format!("n{}", i - 1))]),
        );
    }
    g
}

/// `width` independent chains of depth 5 each, sharing no keys: exercises
/// the multi-root traversal loop in `toposort`'s work-list.
fn create_wide_forest(width: usize) -> Graph {
    let mut g: Graph = HashMap::new();
    for w in 0..width {
        g.insert(Key::str(format!("r{w}-0")), Value::int(w as i64));
        for i in 1..=5 {
            g.insert(
                Key::str(format!("r{w}-{i}")),
                Value::task(inc(), vec![Value::key_ref(format!("r{w}-{}", i - 1))]),
            );
        }
    }
    g
}

fn bench_toposort_deep_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("toposort_deep_chain");
    for depth in [100, 1_000, 10_000].iter() {
        let g = create_deep_chain(*depth);
        let deps = all_dependencies_set(&g);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &(g, deps), |b, (g, deps)| {
            b.iter(|| toposort(black_box(g), black_box(deps)))
        });
    }
    group.finish();
}

fn bench_toposort_wide_forests(c: &mut Criterion) {
    let mut group = c.benchmark_group("toposort_wide_forest");
    for width in [100, 1_000, 10_000].iter() {
        let g = create_wide_forest(*width);
        let deps = all_dependencies_set(&g);
        group.bench_with_input(BenchmarkId::from_parameter(width), &(g, deps), |b, (g, deps)| {
            b.iter(|| toposort(black_box(g), black_box(deps)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_toposort_deep_chains, bench_toposort_wide_forests);
criterion_main!(benches);
