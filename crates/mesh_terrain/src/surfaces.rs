//! Analytic surfaces for testing and debugging.
//!
//! These surfaces answer ray queries in closed form, so the heightmaps they
//! produce are easy to verify by hand. Use them to check sampler behavior
//! without building a triangle mesh.

use glam::Vec3;

use crate::surface::RaySurface;
use crate::types::Bounds;

const PARALLEL_EPSILON: f32 = 1e-8;

/// Solid axis-aligned box.
///
/// Rays that start inside the box hit at their origin. Boundaries are
/// inclusive, so a vertical ray exactly on an edge still hits the top face.
#[derive(Clone, Debug)]
pub struct BoxSurface {
  pub bounds: Bounds,
}

impl BoxSurface {
  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self {
      bounds: Bounds::new(min, max),
    }
  }
}

impl RaySurface for BoxSurface {
  fn bounding_box(&self) -> Bounds {
    self.bounds
  }

  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    if self.bounds.contains_point(origin) {
      return Some(origin);
    }

    let mut t_enter = 0.0f32;
    let mut t_exit = max_distance;

    for axis in 0..3 {
      let o = origin[axis];
      let d = direction[axis];
      let lo = self.bounds.min[axis];
      let hi = self.bounds.max[axis];

      if d.abs() < PARALLEL_EPSILON {
        // Parallel to this slab: must already be inside it
        if o < lo || o > hi {
          return None;
        }
        continue;
      }

      let inv = 1.0 / d;
      let (t0, t1) = {
        let a = (lo - o) * inv;
        let b = (hi - o) * inv;
        if a <= b { (a, b) } else { (b, a) }
      };
      t_enter = t_enter.max(t0);
      t_exit = t_exit.min(t1);
      if t_enter > t_exit {
        return None;
      }
    }

    Some(origin + direction * t_enter)
  }
}

/// Solid sphere.
#[derive(Clone, Debug)]
pub struct SphereSurface {
  pub center: Vec3,
  pub radius: f32,
}

impl SphereSurface {
  pub fn new(center: Vec3, radius: f32) -> Self {
    Self { center, radius }
  }
}

impl RaySurface for SphereSurface {
  fn bounding_box(&self) -> Bounds {
    Bounds::from_center_size(self.center, Vec3::splat(self.radius * 2.0))
  }

  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    let oc = origin - self.center;
    let a = direction.length_squared();
    let half_b = oc.dot(direction);
    let c = oc.length_squared() - self.radius * self.radius;

    if c <= 0.0 {
      return Some(origin);
    }

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 || a == 0.0 {
      return None;
    }

    let t = (-half_b - discriminant.sqrt()) / a;
    (t >= 0.0 && t <= max_distance).then(|| origin + direction * t)
  }
}

/// Rectangular patch of a plane sloping along X.
///
/// Height is `base_height + slope * (x - min_x)` over the footprint
/// `[min_x, max_x] × [min_z, max_z]`. Useful for checking that heights ramp
/// linearly across heightmap columns.
#[derive(Clone, Debug)]
pub struct TiltedPlaneSurface {
  pub min_xz: [f32; 2],
  pub max_xz: [f32; 2],
  pub base_height: f32,
  pub slope: f32,
}

impl TiltedPlaneSurface {
  pub fn new(min_xz: [f32; 2], max_xz: [f32; 2], base_height: f32, slope: f32) -> Self {
    Self {
      min_xz,
      max_xz,
      base_height,
      slope,
    }
  }

  fn normal(&self) -> Vec3 {
    Vec3::new(-self.slope, 1.0, 0.0).normalize()
  }

  fn anchor(&self) -> Vec3 {
    Vec3::new(self.min_xz[0], self.base_height, self.min_xz[1])
  }
}

impl RaySurface for TiltedPlaneSurface {
  fn bounding_box(&self) -> Bounds {
    let rise = self.slope * (self.max_xz[0] - self.min_xz[0]);
    let y0 = self.base_height.min(self.base_height + rise);
    let y1 = self.base_height.max(self.base_height + rise);
    Bounds::new(
      Vec3::new(self.min_xz[0], y0, self.min_xz[1]),
      Vec3::new(self.max_xz[0], y1, self.max_xz[1]),
    )
  }

  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    let normal = self.normal();
    let denom = direction.dot(normal);
    if denom.abs() < PARALLEL_EPSILON {
      return None;
    }

    let t = (self.anchor() - origin).dot(normal) / denom;
    if t < 0.0 || t > max_distance {
      return None;
    }

    let hit = origin + direction * t;
    let inside = hit.x >= self.min_xz[0]
      && hit.x <= self.max_xz[0]
      && hit.z >= self.min_xz[1]
      && hit.z <= self.max_xz[1];
    inside.then_some(hit)
  }
}
