//! Benchmarks for the CPU noise and shading path.
//!
//! Run with: `cargo bench --bench noise`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use icoglow::noise::simplex3;
use icoglow::shading::shade_fragment;

fn bench_simplex(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplex3");

    group.bench_function("single", |b| {
        let p = Vec3::new(0.3, -1.7, 2.9);
        b.iter(|| black_box(simplex3(black_box(p))))
    });

    for count in [100usize, 1500, 10_000] {
        let points: Vec<Vec3> = (0..count)
            .map(|i| {
                let t = i as f32 * 0.013;
                Vec3::new(t.sin() * 4.0, t.cos() * 4.0, t)
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("batch", count), &points, |b, points| {
            b.iter(|| points.iter().map(|p| simplex3(*p)).sum::<f32>())
        });
    }

    group.finish();
}

fn bench_shade_fragment(c: &mut Criterion) {
    let normal = Vec3::new(0.2, 0.5, 0.84).normalize();
    let view_pos = Vec3::new(0.1, -0.3, -2.5);

    c.bench_function("shade_fragment", |b| {
        b.iter(|| black_box(shade_fragment(black_box(normal), black_box(view_pos), 1.25)))
    });
}

criterion_group!(benches, bench_simplex, bench_shade_fragment);
criterion_main!(benches);
