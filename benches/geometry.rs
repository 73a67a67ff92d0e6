//! Benchmarks for mesh generation and the sprite texture.
//!
//! Run with: `cargo bench --bench geometry`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use icoglow::geometry::Geometry;
use icoglow::textures::particle_sprite;
use icoglow::{OrbConfig, Scene};

fn bench_icosahedron(c: &mut Criterion) {
    let mut group = c.benchmark_group("icosahedron");

    for detail in [0u32, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("detail", detail), &detail, |b, &detail| {
            b.iter(|| black_box(Geometry::icosahedron(1.0, detail)))
        });
    }

    group.bench_function("line_indices", |b| {
        let geometry = Geometry::icosahedron(1.0, 4);
        b.iter(|| black_box(geometry.line_indices()))
    });

    group.finish();
}

fn bench_sprite(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_sprite");
    for size in [32u32, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(particle_sprite(size)))
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let config = OrbConfig::default();
    c.bench_function("scene_compose", |b| b.iter(|| black_box(Scene::compose(&config))));
}

criterion_group!(benches, bench_icosahedron, bench_sprite, bench_compose);
criterion_main!(benches);
