//! Surface capability consumed by the sampler.
//!
//! Any geometry backend can drive heightmap generation as long as it can
//! report an axis-aligned bounding box and answer ray queries: a triangle mesh
//! raycaster ([`crate::TriangleMesh`]), a physics-engine collider, an analytic
//! shape ([`crate::surfaces`]), or a heightfield loader.

use std::sync::Arc;

use glam::Vec3;

use crate::types::Bounds;

/// Bounded surface that answers ray intersection queries.
///
/// Implementations must be safe to query from several threads at once: the
/// sampler casts rays for different rows in parallel against one shared,
/// immutable surface.
pub trait RaySurface: Send + Sync {
  /// World-space bounding box of the surface.
  fn bounding_box(&self) -> Bounds;

  /// Cast a ray and return the nearest hit point.
  ///
  /// # Parameters
  /// - `origin`: World-space ray origin
  /// - `direction`: Unit ray direction
  /// - `max_distance`: Hits farther than this along the ray are ignored
  ///
  /// Returns `None` when nothing is hit within `max_distance`.
  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3>;
}

impl<T: RaySurface + ?Sized> RaySurface for &T {
  fn bounding_box(&self) -> Bounds {
    (**self).bounding_box()
  }

  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    (**self).cast_ray(origin, direction, max_distance)
  }
}

impl<T: RaySurface + ?Sized> RaySurface for Box<T> {
  fn bounding_box(&self) -> Bounds {
    (**self).bounding_box()
  }

  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    (**self).cast_ray(origin, direction, max_distance)
  }
}

impl<T: RaySurface + ?Sized> RaySurface for Arc<T> {
  fn bounding_box(&self) -> Bounds {
    (**self).bounding_box()
  }

  fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    (**self).cast_ray(origin, direction, max_distance)
  }
}
