//! Benchmark sequential vs parallel heightmap sampling over analytic and
//! triangle mesh surfaces.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use mesh_terrain::{
  generate_with, surfaces::SphereSurface, GenerationParameters, SampleOptions, TriangleMesh,
};

/// Grid mesh of a smooth bump, `cells × cells` quads over `[0, size]²`.
fn bump_mesh(cells: u32, size: f32) -> TriangleMesh {
  let verts_per_side = cells + 1;
  let mut positions = Vec::with_capacity((verts_per_side * verts_per_side) as usize);
  for z in 0..verts_per_side {
    for x in 0..verts_per_side {
      let fx = x as f32 / cells as f32;
      let fz = z as f32 / cells as f32;
      let height = (fx * std::f32::consts::PI).sin() * (fz * std::f32::consts::PI).sin() * size * 0.25;
      positions.push([fx * size, height, fz * size]);
    }
  }

  let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
  for z in 0..cells {
    for x in 0..cells {
      let i = z * verts_per_side + x;
      indices.extend_from_slice(&[i, i + 1, i + verts_per_side + 1, i, i + verts_per_side + 1, i + verts_per_side]);
    }
  }

  TriangleMesh::new(positions, indices).expect("valid bump mesh")
}

fn bench_sphere(c: &mut Criterion) {
  let sphere = SphereSurface::new(Vec3::ZERO, 50.0);
  let mut group = c.benchmark_group("sphere");

  for resolution in [129u32, 257, 513] {
    let params = GenerationParameters::new().with_resolution(resolution);
    group.bench_with_input(BenchmarkId::new("sequential", resolution), &params, |b, params| {
      b.iter(|| generate_with(black_box(&sphere), params, &SampleOptions::new()))
    });
    group.bench_with_input(BenchmarkId::new("parallel", resolution), &params, |b, params| {
      b.iter(|| generate_with(black_box(&sphere), params, &SampleOptions::new().with_parallel(true)))
    });
  }

  group.finish();
}

fn bench_trimesh(c: &mut Criterion) {
  let mesh = bump_mesh(128, 100.0);
  let params = GenerationParameters::new()
    .with_resolution(257)
    .with_padding(Vec3::new(10.0, 5.0, 10.0));

  c.bench_function("trimesh 128² quads @ 257²", |b| {
    b.iter(|| generate_with(black_box(&mesh), &params, &SampleOptions::new().with_parallel(true)))
  });
}

criterion_group!(benches, bench_sphere, bench_trimesh);
criterion_main!(benches);
