//! Plane extraction and grid transposition.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voxel_occlusion::plane_finder::{transpose16, transpose_grid};
use voxel_occlusion::{Axis, OccupancyGrid, PlaneFinder};

fn bench_transpose(c: &mut Criterion) {
  let mut rng = StdRng::seed_from_u64(16);
  let mut rows = [0u16; 16];
  rows.iter_mut().for_each(|row| *row = rng.random());

  c.bench_function("transpose16", |b| {
    b.iter(|| {
      transpose16(black_box(&mut rows));
      black_box(rows)
    })
  });

  let grid = OccupancyGrid::from_fn(|_, _, _| rng.random_bool(0.5));
  let mut out = Default::default();
  c.bench_function("transpose_grid (X)", |b| {
    b.iter(|| {
      transpose_grid(black_box(&grid), Axis::X, &mut out);
      black_box(&out);
    })
  });
}

fn bench_plane_finder(c: &mut Criterion) {
  let mut group = c.benchmark_group("plane_finder");
  let mut finder = PlaneFinder::new();

  // Walls through the middle of the region on every axis
  let cross = OccupancyGrid::from_fn(|x, y, z| x == 8 || y == 7 || z == 8);
  group.bench_function("cross", |b| b.iter(|| black_box(finder.find(black_box(&cross)).len())));

  let full = OccupancyGrid::full();
  group.bench_function("full", |b| b.iter(|| black_box(finder.find(black_box(&full)).len())));

  let mut rng = StdRng::seed_from_u64(7);
  let noise = OccupancyGrid::from_fn(|_, _, _| rng.random_bool(0.7));
  group.bench_function("noise_70", |b| b.iter(|| black_box(finder.find(black_box(&noise)).len())));

  group.finish();
}

criterion_group!(benches, bench_transpose, bench_plane_finder);
criterion_main!(benches);
