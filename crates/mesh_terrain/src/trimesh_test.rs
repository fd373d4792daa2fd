use glam::Vec3;

use super::*;
use crate::sampler::generate;
use crate::surfaces::BoxSurface;
use crate::types::GenerationParameters;

/// Horizontal quad at height `y` split into two triangles.
fn quad(min: [f32; 2], max: [f32; 2], y: f32) -> TriangleMesh {
  TriangleMesh::new(
    vec![
      [min[0], y, min[1]],
      [max[0], y, min[1]],
      [max[0], y, max[1]],
      [min[0], y, max[1]],
    ],
    vec![0, 1, 2, 0, 2, 3],
  )
  .unwrap()
}

/// Closed axis-aligned box as 12 triangles.
///
/// Corner `i` takes max X if bit 0 is set, max Y for bit 1, max Z for bit 2.
fn box_mesh(min: Vec3, max: Vec3) -> TriangleMesh {
  let corners: Vec<[f32; 3]> = (0..8)
    .map(|i| {
      [
        if i & 1 == 0 { min.x } else { max.x },
        if i & 2 == 0 { min.y } else { max.y },
        if i & 4 == 0 { min.z } else { max.z },
      ]
    })
    .collect();
  let indices = vec![
    0, 1, 5, 0, 5, 4, // bottom
    2, 3, 7, 2, 7, 6, // top
    0, 1, 3, 0, 3, 2, // -z
    4, 5, 7, 4, 7, 6, // +z
    0, 2, 6, 0, 6, 4, // -x
    1, 3, 7, 1, 7, 5, // +x
  ];
  TriangleMesh::new(corners, indices).unwrap()
}

/// Square pyramid with apex at `(0, height, 0)` over `[-1, 1]²`.
fn pyramid(height: f32) -> TriangleMesh {
  TriangleMesh::new(
    vec![
      [-1.0, 0.0, -1.0],
      [1.0, 0.0, -1.0],
      [1.0, 0.0, 1.0],
      [-1.0, 0.0, 1.0],
      [0.0, height, 0.0],
    ],
    vec![0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4],
  )
  .unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_bounds_from_vertices() {
  let mesh = pyramid(2.0);
  let bounds = mesh.bounding_box();

  assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -1.0));
  assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 1.0));
  assert_eq!(mesh.vertex_count(), 5);
  assert_eq!(mesh.triangle_count(), 4);
}

#[test]
fn test_from_flat_buffer() {
  let mesh = TriangleMesh::from_flat(
    &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    &[0, 1, 2],
  )
  .unwrap();
  assert_eq!(mesh.vertex_count(), 3);
  assert_eq!(mesh.triangle_count(), 1);
  assert_eq!(mesh.bounding_box(), Bounds::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)));
}

#[test]
fn test_rejects_partial_triangle() {
  let err = TriangleMesh::new(vec![[0.0; 3]; 3], vec![0, 1]).unwrap_err();
  assert_eq!(err, MeshError::IndexCountNotTriangles(2));
}

#[test]
fn test_rejects_out_of_range_index() {
  let err = TriangleMesh::new(vec![[0.0; 3]; 3], vec![0, 1, 3]).unwrap_err();
  assert_eq!(
    err,
    MeshError::IndexOutOfRange {
      index: 3,
      vertex_count: 3
    }
  );
}

#[test]
fn test_rejects_empty_and_bad_buffers() {
  assert_eq!(
    TriangleMesh::new(vec![[0.0; 3]; 3], vec![]).unwrap_err(),
    MeshError::Empty
  );
  assert_eq!(
    TriangleMesh::from_flat(&[0.0; 4], &[0, 0, 0]).unwrap_err(),
    MeshError::PositionCountNotVectors(4)
  );
  assert_eq!(
    TriangleMesh::new(vec![[0.0; 3], [f32::NAN, 0.0, 0.0], [1.0; 3]], vec![0, 1, 2]).unwrap_err(),
    MeshError::NonFiniteVertex(1)
  );
}

// =============================================================================
// Ray casting
// =============================================================================

#[test]
fn test_vertical_ray_hits_quad() {
  let mesh = quad([0.0, 0.0], [4.0, 4.0], 2.0);
  let hit = mesh.cast_ray(Vec3::new(1.0, 10.0, 3.0), Vec3::NEG_Y, 20.0);
  assert_eq!(hit, Some(Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn test_shared_edge_does_not_leak() {
  // (2, 2) lies on the diagonal shared by both triangles
  let mesh = quad([0.0, 0.0], [4.0, 4.0], 2.0);
  assert!(mesh.cast_ray(Vec3::new(2.0, 10.0, 2.0), Vec3::NEG_Y, 20.0).is_some());
}

#[test]
fn test_ray_outside_footprint_misses() {
  let mesh = quad([0.0, 0.0], [4.0, 4.0], 2.0);
  assert!(mesh.cast_ray(Vec3::new(5.0, 10.0, 1.0), Vec3::NEG_Y, 20.0).is_none());
}

#[test]
fn test_max_distance_limits_hits() {
  let mesh = quad([0.0, 0.0], [4.0, 4.0], 2.0);
  assert!(mesh.cast_ray(Vec3::new(1.0, 10.0, 1.0), Vec3::NEG_Y, 7.0).is_none());
  assert!(mesh.cast_ray(Vec3::new(1.0, 10.0, 1.0), Vec3::NEG_Y, 8.0).is_some());
}

#[test]
fn test_nearest_of_stacked_surfaces() {
  let mesh = box_mesh(Vec3::ZERO, Vec3::new(4.0, 3.0, 4.0));
  let hit = mesh.cast_ray(Vec3::new(2.0, 10.0, 1.0), Vec3::NEG_Y, 20.0).unwrap();
  assert!((hit.y - 3.0).abs() < 1e-5, "expected top face, got {:?}", hit);
}

#[test]
fn test_oblique_ray_uses_all_triangles() {
  let mesh = quad([0.0, 0.0], [4.0, 4.0], 0.0);
  let direction = Vec3::new(1.0, -1.0, 0.0).normalize();
  let hit = mesh.cast_ray(Vec3::new(0.0, 2.0, 1.0), direction, 10.0).unwrap();
  assert!((hit - Vec3::new(2.0, 0.0, 1.0)).length() < 1e-5);
}

#[test]
fn test_column_grid_matches_exhaustive_search() {
  let mesh = pyramid(3.0);
  for zi in 0..=20 {
    for xi in 0..=20 {
      // Offsets stay clear of the x = 0 / z = 0 column boundary
      let origin = Vec3::new(-1.15 + xi as f32 * 0.11, 10.0, -1.15 + zi as f32 * 0.11);
      let fast = mesh.cast_ray(origin, Vec3::NEG_Y, 20.0);
      let slow = mesh.cast_ray_exhaustive(origin, Vec3::NEG_Y, 20.0);
      assert_eq!(fast, slow, "mismatch at {:?}", origin);
    }
  }
}

// =============================================================================
// Heightmaps from meshes
// =============================================================================

#[test]
fn test_box_mesh_matches_analytic_box() {
  let min = Vec3::ZERO;
  let max = Vec3::new(10.0, 5.0, 10.0);
  let params = GenerationParameters::new()
    .with_resolution(4)
    .with_padding(Vec3::new(10.0, 5.0, 10.0));

  let from_mesh = generate(&box_mesh(min, max), &params).unwrap();
  let from_box = generate(&BoxSurface::new(min, max), &params).unwrap();

  for (a, b) in from_mesh.as_slice().iter().zip(from_box.as_slice()) {
    assert!((a - b).abs() < 1e-6, "mesh {} vs box {}", a, b);
  }
}

#[test]
fn test_pyramid_peaks_in_center() {
  let params = GenerationParameters::new().with_resolution(9);
  let map = generate(&pyramid(2.0), &params).unwrap();

  let (_, max) = map.min_max().unwrap();
  // Padded footprint is [-1, 1]; the center sample (row 4, col 4) is x = z = -1 + 4 * 2/9
  let center = map.get(4, 4).unwrap();
  assert!(center > 0.8, "center height {} too low", center);
  assert!(max <= 1.0);
  assert!(map.get(0, 0).unwrap() < center);
  assert!(map.get(8, 8).unwrap() < center);
}
