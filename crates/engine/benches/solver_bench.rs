//! Benchmarks for the pallet loading pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pallet_core::{Config, Solver};
use pallet_engine::{
    fitting_orientations, Candidate, Carrier, Catalog, Item, Palletizer, SkylineResolver,
};

fn mixed_items(n: u32) -> Vec<Item> {
    (0..n)
        .map(|i| {
            let k = f64::from(i % 5);
            Item::new(i, 0.3 + 0.05 * k, 0.25 + 0.04 * k, 0.2 + 0.03 * k, 10.0 + 4.0 * k)
                .with_fragile(i % 4 == 0)
                .with_priority(1 + i % 5)
        })
        .collect()
}

fn search_benchmark(c: &mut Criterion) {
    let catalog = Catalog::new(
        mixed_items(12),
        vec![Carrier::pbr(0).with_max_mass(180.0), Carrier::euro(1)],
    )
    .unwrap();
    let solver = Palletizer::new(Config::new().with_threads(1).with_max_nodes(20_000));

    c.bench_function("solve_12_mixed_items", |b| {
        b.iter(|| {
            let report = solver.solve(black_box(&catalog));
            black_box(report)
        })
    });
}

fn skyline_benchmark(c: &mut Criterion) {
    let items: Vec<Item> = (0..20).map(|i| Item::new(i, 0.4, 0.3, 0.3, 10.0)).collect();
    let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
    let carrier = &catalog.carriers()[0];
    let orientations: Vec<_> = catalog
        .items()
        .iter()
        .map(|item| fitting_orientations(item, carrier))
        .collect();
    let candidates: Vec<_> = catalog
        .items()
        .iter()
        .zip(&orientations)
        .map(|(item, o)| Candidate {
            item,
            orientations: o,
        })
        .collect();

    c.bench_function("skyline_20_uniform_boxes", |b| {
        b.iter(|| {
            let layout = SkylineResolver::new(carrier).resolve(black_box(&candidates));
            black_box(layout)
        })
    });
}

criterion_group!(benches, search_benchmark, skyline_benchmark);
criterion_main!(benches);
