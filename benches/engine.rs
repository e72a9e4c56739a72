//! Benchmarks for the CPU side of the frame: the per-particle update and
//! stroke emission. The GPU never appears here.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vortex::{VortexConfig, VortexEngine};

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_update");

    for count in [100usize, 700, 5_000] {
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            let config = VortexConfig::default().with_particle_count(count);
            let mut engine = VortexEngine::new(config);
            engine.start(1920.0, 1080.0);
            b.iter(|| {
                black_box(engine.update().len());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
