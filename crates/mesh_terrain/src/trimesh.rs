//! Triangle mesh raycaster.
//!
//! A [`TriangleMesh`] is a world-space triangle list that implements
//! [`RaySurface`]. Triangles are bucketed into a uniform XZ column grid at
//! construction, so a vertical ray only tests the triangles whose XZ footprint
//! overlaps its column. Rays in any other direction test every triangle.

use glam::{Vec2, Vec3};

use crate::error::MeshError;
use crate::surface::RaySurface;
use crate::types::Bounds;

/// Determinant below which a ray is treated as parallel to a triangle.
const DET_EPSILON: f32 = 1e-12;

/// Barycentric tolerance; keeps rays on shared edges from slipping through.
const EDGE_EPSILON: f32 = 1e-6;

/// Direction components below this count as zero for the vertical fast path.
const VERTICAL_EPSILON: f32 = 1e-6;

/// Upper bound on grid cells per axis.
const MAX_COLUMNS_PER_AXIS: u32 = 256;

// =============================================================================
// Column grid
// =============================================================================

/// Uniform XZ grid mapping each column to the triangles overlapping it.
#[derive(Clone, Debug)]
struct ColumnGrid {
  origin: Vec2,
  cell_size: Vec2,
  dims: [u32; 2],
  cells: Vec<Vec<u32>>,
}

impl ColumnGrid {
  fn build(bounds: &Bounds, positions: &[Vec3], triangles: &[[u32; 3]]) -> Self {
    // Roughly one triangle per column on average
    let per_axis = ((triangles.len() as f32).sqrt().ceil() as u32).clamp(1, MAX_COLUMNS_PER_AXIS);
    let size = bounds.size();
    let axis_dims = |extent: f32| if extent > 0.0 { per_axis } else { 1 };
    let dims = [axis_dims(size.x), axis_dims(size.z)];
    let cell_extent = |extent: f32, n: u32| if extent > 0.0 { extent / n as f32 } else { 1.0 };

    let mut grid = Self {
      origin: Vec2::new(bounds.min.x, bounds.min.z),
      cell_size: Vec2::new(cell_extent(size.x, dims[0]), cell_extent(size.z, dims[1])),
      dims,
      cells: vec![Vec::new(); (dims[0] * dims[1]) as usize],
    };

    for (tri_idx, tri) in triangles.iter().enumerate() {
      let [a, b, c] = tri.map(|i| positions[i as usize]);
      let min = a.min(b).min(c);
      let max = a.max(b).max(c);
      let (x0, z0) = grid.cell_coords(min.x, min.z);
      let (x1, z1) = grid.cell_coords(max.x, max.z);

      for z in z0..=z1 {
        for x in x0..=x1 {
          let idx = grid.cell_index(x, z);
          grid.cells[idx].push(tri_idx as u32);
        }
      }
    }

    grid
  }

  /// Column coordinates for a world XZ position, clamped into the grid.
  #[inline]
  fn cell_coords(&self, x: f32, z: f32) -> (u32, u32) {
    let fx = ((x - self.origin.x) / self.cell_size.x).floor();
    let fz = ((z - self.origin.y) / self.cell_size.y).floor();
    (
      (fx.max(0.0) as u32).min(self.dims[0] - 1),
      (fz.max(0.0) as u32).min(self.dims[1] - 1),
    )
  }

  #[inline]
  fn cell_index(&self, x: u32, z: u32) -> usize {
    (z * self.dims[0] + x) as usize
  }

  /// Triangles that may be hit by a vertical ray at `(x, z)`.
  #[inline]
  fn candidates(&self, x: f32, z: f32) -> &[u32] {
    let (cx, cz) = self.cell_coords(x, z);
    &self.cells[self.cell_index(cx, cz)]
  }
}

// =============================================================================
// Triangle mesh
// =============================================================================

/// World-space triangle list with a vertical-ray acceleration grid.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
  positions: Vec<Vec3>,
  triangles: Vec<[u32; 3]>,
  bounds: Bounds,
  columns: ColumnGrid,
}

impl TriangleMesh {
  /// Build a mesh from vertex positions and a triangle-list index buffer.
  pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Result<Self, MeshError> {
    let positions: Vec<Vec3> = positions.into_iter().map(Vec3::from_array).collect();
    Self::from_vec3(positions, &indices)
  }

  /// Build a mesh from a flat `[x, y, z, x, y, z, ...]` position buffer.
  pub fn from_flat(positions: &[f32], indices: &[u32]) -> Result<Self, MeshError> {
    if positions.len() % 3 != 0 {
      return Err(MeshError::PositionCountNotVectors(positions.len()));
    }
    let positions = positions.chunks_exact(3).map(Vec3::from_slice).collect();
    Self::from_vec3(positions, indices)
  }

  fn from_vec3(positions: Vec<Vec3>, indices: &[u32]) -> Result<Self, MeshError> {
    if indices.len() % 3 != 0 {
      return Err(MeshError::IndexCountNotTriangles(indices.len()));
    }
    if indices.is_empty() {
      return Err(MeshError::Empty);
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
      return Err(MeshError::IndexOutOfRange {
        index,
        vertex_count: positions.len(),
      });
    }

    let mut bounds = Bounds::empty();
    for (i, p) in positions.iter().enumerate() {
      if !p.is_finite() {
        return Err(MeshError::NonFiniteVertex(i));
      }
      bounds.encapsulate(*p);
    }

    let triangles: Vec<[u32; 3]> = indices
      .chunks_exact(3)
      .map(|t| [t[0], t[1], t[2]])
      .collect();
    let columns = ColumnGrid::build(&bounds, &positions, &triangles);

    Ok(Self {
      positions,
      triangles,
      bounds,
      columns,
    })
  }

  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.triangles.len()
  }

  /// Nearest hit distance over the given triangles.
  fn nearest_hit(
    &self,
    candidates: impl Iterator<Item = u32>,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
  ) -> Option<f32> {
    let mut best: Option<f32> = None;
    for tri_idx in candidates {
      let [a, b, c] = self.triangles[tri_idx as usize].map(|i| self.positions[i as usize]);
      if let Some(t) = intersect_triangle(origin, direction, a, b, c) {
        if t <= max_distance && best.map_or(true, |current| t < current) {
          best = Some(t);
        }
      }
    }
    best
  }

  /// Test every triangle, ignoring the column grid.
  pub(crate) fn cast_ray_exhaustive(
    &self,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
  ) -> Option<Vec3> {
    self
      .nearest_hit(0..self.triangles.len() as u32, origin, direction, max_distance)
      .map(|t| origin + direction * t)
  }
}

impl RaySurface for TriangleMesh {
  fn bounding_box(&self) -> Bounds {
    self.bounds
  }

  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    let vertical = direction.x.abs() < VERTICAL_EPSILON && direction.z.abs() < VERTICAL_EPSILON;
    if !vertical {
      return self.cast_ray_exhaustive(origin, direction, max_distance);
    }

    let candidates = self.columns.candidates(origin.x, origin.z).iter().copied();
    self
      .nearest_hit(candidates, origin, direction, max_distance)
      .map(|t| origin + direction * t)
  }
}

/// Möller–Trumbore ray/triangle intersection, double sided.
///
/// Returns the distance along `direction` to the hit, if any, for `t >= 0`.
#[inline]
fn intersect_triangle(origin: Vec3, direction: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
  let edge1 = b - a;
  let edge2 = c - a;
  let p = direction.cross(edge2);
  let det = edge1.dot(p);
  if det.abs() < DET_EPSILON {
    return None;
  }

  let inv_det = 1.0 / det;
  let s = origin - a;
  let u = s.dot(p) * inv_det;
  if !(-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&u) {
    return None;
  }

  let q = s.cross(edge1);
  let v = direction.dot(q) * inv_det;
  if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
    return None;
  }

  let t = edge2.dot(q) * inv_det;
  (t >= 0.0).then_some(t)
}

#[cfg(test)]
#[path = "trimesh_test.rs"]
mod trimesh_test;
