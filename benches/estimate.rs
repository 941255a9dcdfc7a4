use catch_estimator_rust::estimator::estimate_weight;
use catch_estimator_rust::{Catalog, SpeciesRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_catalog(n: usize) -> Catalog {
    Catalog::new(
        (0..n)
            .map(|i| SpeciesRecord::new(format!("Species {i} bream"), -11.0, 3.0))
            .collect(),
    )
}

fn bench_estimate(c: &mut Criterion) {
    let record = SpeciesRecord::new("Roman", -11.0, 3.08);
    c.bench_function("estimate_weight", |b| {
        b.iter(|| estimate_weight(black_box(&record), black_box(34.5)))
    });
}

fn bench_search(c: &mut Criterion) {
    let catalog = synthetic_catalog(2_000);
    c.bench_function("search_substring_2000", |b| {
        b.iter(|| catalog.search(black_box("99 BREAM")).len())
    });
    c.bench_function("lookup_exact_2000", |b| {
        b.iter(|| catalog.get(black_box("species 1999 bream")).is_some())
    });
}

criterion_group!(benches, bench_estimate, bench_search);
criterion_main!(benches);
