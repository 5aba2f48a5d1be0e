//! Frustum plane extraction and conservative box tests.
//!
//! All tests run in camera-relative `f32` space: world positions are made
//! relative to the camera position cached at the last plane extraction, so
//! precision does not degrade far from the world origin.
//!
//! # Module Structure
//!
//! - [`Frustum`]: Gribb–Hartmann planes, AABB and region tests
//! - [`terrain`]: `TerrainFrustum` - versioned camera frustum
//! - [`region_culling`]: `RegionCullingFrustum` - coarse macro-visibility gate

pub mod region_culling;
pub mod terrain;

pub use region_culling::{MacroVisibilityStore, NoMacroVisibility, RegionCullingFrustum};
pub use terrain::{ProjectionInputs, TerrainFrustum};

use glam::{DVec3, IVec3, Mat4, Vec3, Vec4};

use crate::constants::{FRUSTUM_EPSILON, HALF_REGION};
use crate::region::region_center;

/// Number of planes tested. The far plane is left to the projection's clip.
pub const PLANE_COUNT: usize = 5;

/// One inward-facing frustum plane with precomputed test terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumPlane {
  pub normal: Vec3,
  pub distance: f32,
  pub abs_normal: Vec3,
  /// `|a| + |b| + |c|`.
  pub abs_sum: f32,
  /// Threshold on `normal · center` below which a whole region lies outside.
  pub region_extent: f32,
}

impl FrustumPlane {
  /// Build from raw coefficients, normalizing.
  pub fn from_coefficients(plane: Vec4) -> Self {
    let len = plane.truncate().length();
    let plane = if len > 0.0 { plane / len } else { Vec4::ZERO };
    let normal = plane.truncate();
    let abs_normal = normal.abs();
    let abs_sum = abs_normal.element_sum();
    Self {
      normal,
      distance: plane.w,
      abs_normal,
      abs_sum,
      region_extent: -plane.w - HALF_REGION * abs_sum - FRUSTUM_EPSILON,
    }
  }

  /// Signed distance (positive inside).
  #[inline]
  pub fn distance_to_point(&self, point: Vec3) -> f32 {
    self.normal.dot(point) + self.distance
  }
}

impl Default for FrustumPlane {
  fn default() -> Self {
    Self::from_coefficients(Vec4::ZERO)
  }
}

/// Camera frustum: planes plus the camera position they are relative to.
#[derive(Clone, Debug)]
pub struct Frustum {
  view_projection: Mat4,
  position: DVec3,
  planes: [FrustumPlane; PLANE_COUNT],
}

impl Default for Frustum {
  fn default() -> Self {
    Self::new()
  }
}

impl Frustum {
  pub fn new() -> Self {
    Self {
      view_projection: Mat4::IDENTITY,
      position: DVec3::ZERO,
      planes: [FrustumPlane::default(); PLANE_COUNT],
    }
  }

  /// Frustum for a camera-relative view-projection at `position`, planes
  /// already extracted.
  pub fn from_view_projection(view_projection: Mat4, position: DVec3) -> Self {
    let mut frustum = Self::new();
    frustum.set_view_projection(view_projection, position);
    frustum.extract_planes();
    frustum
  }

  /// Store a new matrix and camera position. Takes effect on the next
  /// [`extract_planes`](Self::extract_planes).
  pub fn set_view_projection(&mut self, view_projection: Mat4, position: DVec3) {
    self.view_projection = view_projection;
    self.position = position;
  }

  /// Gribb–Hartmann extraction with OpenGL depth (`-w <= z <= w`): left,
  /// right, bottom, top, near.
  pub fn extract_planes(&mut self) {
    let m = self.view_projection;
    let row0 = m.row(0);
    let row1 = m.row(1);
    let row2 = m.row(2);
    let row3 = m.row(3);

    self.planes = [
      FrustumPlane::from_coefficients(row3 + row0),
      FrustumPlane::from_coefficients(row3 - row0),
      FrustumPlane::from_coefficients(row3 + row1),
      FrustumPlane::from_coefficients(row3 - row1),
      FrustumPlane::from_coefficients(row3 + row2),
    ];
  }

  #[inline]
  pub fn view_projection(&self) -> Mat4 {
    self.view_projection
  }

  /// Camera position the planes are relative to.
  #[inline]
  pub fn position(&self) -> DVec3 {
    self.position
  }

  #[inline]
  pub fn planes(&self) -> &[FrustumPlane; PLANE_COUNT] {
    &self.planes
  }

  /// World-space point relative to the cached camera position.
  #[inline]
  pub fn relative(&self, world: DVec3) -> Vec3 {
    (world - self.position).as_vec3()
  }

  /// Conservative AABB test in camera-relative space. False only when the
  /// box lies entirely outside one plane.
  pub fn cube_in_frustum(&self, min: Vec3, max: Vec3) -> bool {
    let center = (min + max) * 0.5;
    let half = (max - min) * 0.5;
    self
      .planes
      .iter()
      .all(|p| p.distance_to_point(center) + p.abs_normal.dot(half) >= -FRUSTUM_EPSILON)
  }

  /// [`cube_in_frustum`](Self::cube_in_frustum) for a world-space block box
  /// (`max` exclusive).
  pub fn is_block_box_visible(&self, min: IVec3, max: IVec3) -> bool {
    self.cube_in_frustum(self.relative(min.as_dvec3()), self.relative(max.as_dvec3()))
  }

  /// Whole-region test using the precomputed region extent.
  pub fn is_region_visible(&self, region: IVec3) -> bool {
    let center = self.relative(region_center(region));
    self.planes.iter().all(|p| p.normal.dot(center) >= p.region_extent)
  }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
