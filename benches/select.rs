//! Selection micro-benchmarks
//!
//! Measures the fast value path against the path-tracking modes that sorting
//! and deduplication require.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use jsonsel::{ChainBuilder, FilterExpr, ResultOptions};
use serde_json::{Value, json};
use std::hint::black_box;

/// A catalogue with `count` items, each carrying a nested attribute block.
fn catalogue(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": i,
                "price": (i % 97) as f64 + 0.5,
                "tags": ["a", "b", "c"],
                "attrs": {"weight": i % 13, "color": if i % 2 == 0 { "red" } else { "blue" }}
            })
        })
        .collect();
    json!({"threshold": 40, "items": items})
}

fn bench_recursive_descent(c: &mut Criterion) {
    let mut group = c.benchmark_group("recursive_descent_price");
    let expr = ChainBuilder::new().root().recursive_descent().identifier("price").build();

    for size in [100, 1_000] {
        let doc = catalogue(size);
        for (label, options) in [
            ("values", ResultOptions::empty()),
            ("paths", ResultOptions::PATH),
            ("sorted_unique", ResultOptions::SORT | ResultOptions::NO_DUPS),
        ] {
            group.bench_with_input(BenchmarkId::new(label, size), &doc, |b, doc| {
                b.iter(|| black_box(expr.select(black_box(doc), options).len()))
            });
        }
    }
    group.finish();
}

fn bench_filter_with_root_reference(c: &mut Criterion) {
    let doc = catalogue(1_000);
    let threshold = FilterExpr::path(ChainBuilder::new().root().identifier("threshold").build());
    let price = FilterExpr::path(ChainBuilder::new().current().identifier("price").build());
    let expr = ChainBuilder::new()
        .root()
        .identifier("items")
        .filter(FilterExpr::lt(price, threshold))
        .identifier("id")
        .build();

    c.bench_function("filter_root_reference_1000", |b| {
        b.iter(|| black_box(expr.select(black_box(&doc), ResultOptions::empty()).len()))
    });
}

criterion_group!(benches, bench_recursive_descent, bench_filter_with_root_reference);
criterion_main!(benches);
