//! ShadowOccluder - orthographic occluder along the light direction with
//! cascade selection.
//!
//! # Cascades
//!
//! ```text
//!   light space (x, y)
//!   ┌──────────────────────────────┐
//!   │ cascade 3                    │
//!   │   ┌──────────────────────┐   │
//!   │   │ cascade 2            │   │   tested largest first; a region
//!   │   │   ┌──────────────┐   │   │   belongs to the smallest cascade
//!   │   │   │ 1  ┌──────┐  │   │   │   whose sphere (grown by the region
//!   │   │   │    │  0   │  │   │   │   half-diagonal) still holds it
//!   │   │   │    └──────┘  │   │   │
//!   │   │   └──────────────┘   │   │
//!   │   └──────────────────────┘   │
//!   └──────────────────────────────┘
//! ```
//!
//! Depth along the light is unbounded: a caster anywhere along the ray can
//! shadow the cascade.

use glam::{DVec3, IVec3, Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

use super::{BoxFaces, OcclusionRaster, Occluder, RegionPlacement};
use crate::constants::{CASCADE_COUNT, HALF_REGION, LIGHT_VECTOR_THRESHOLD};
use crate::error::ConfigError;
use crate::packed_box::PackedBox;
use crate::region::region_center;

/// Lit faces per light octant. Index bit 0/1/2 is set when the light travels
/// towards -X/-Y/-Z.
pub const LIGHT_OCTANT_FACES: [BoxFaces; 8] = {
  let mut table = [BoxFaces::NONE; 8];
  let mut i = 0;
  while i < 8 {
    let x = if i & 1 != 0 { BoxFaces::POS_X } else { BoxFaces::NEG_X };
    let y = if i & 2 != 0 { BoxFaces::POS_Y } else { BoxFaces::NEG_Y };
    let z = if i & 4 != 0 { BoxFaces::POS_Z } else { BoxFaces::NEG_Z };
    table[i] = x.union(y).union(z);
    i += 1;
  }
  table
};

/// Octant index of a light travel direction.
#[inline]
pub fn light_octant(light_vector: Vec3) -> usize {
  (light_vector.x < 0.0) as usize | ((light_vector.y < 0.0) as usize) << 1 | ((light_vector.z < 0.0) as usize) << 2
}

/// Per-frame shadow matrices handed over by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowMatrixData {
  /// Camera-relative world space to light space.
  pub light_view: Mat4,
  pub light_projection: Mat4,
  /// Light-space sphere per cascade: `xyz` center, `w` radius. Nested,
  /// smallest first.
  pub cascades: [Vec4; CASCADE_COUNT],
  /// Direction the light travels.
  pub light_vector: Vec3,
}

impl ShadowMatrixData {
  pub fn validate(&self) -> Result<(), ConfigError> {
    let length = self.light_vector.length();
    if !length.is_finite() || length <= 0.0 {
      return Err(ConfigError::ZeroLightVector);
    }

    for (index, cascade) in self.cascades.iter().enumerate() {
      if !cascade.w.is_finite() || cascade.w <= 0.0 {
        return Err(ConfigError::InvalidCascadeRadius {
          index,
          radius: cascade.w,
        });
      }
    }

    for (index, pair) in self.cascades.windows(2).enumerate() {
      if pair[0].w > pair[1].w {
        return Err(ConfigError::CascadesNotNested {
          index,
          radius: pair[0].w,
          next: pair[1].w,
        });
      }
    }
    Ok(())
  }
}

pub struct ShadowOccluder<R> {
  raster: R,
  version: u64,
  view_version: Option<u64>,
  camera: DVec3,
  light_vector: Vec3,
  light_view: Mat4,
  light_projection: Mat4,
  cascades: [Vec4; CASCADE_COUNT],
  max_region_extent: f32,
  faces: BoxFaces,
  placement: RegionPlacement,
}

impl<R: OcclusionRaster> ShadowOccluder<R> {
  pub fn new(raster: R) -> Self {
    Self {
      raster,
      version: 0,
      view_version: None,
      camera: DVec3::ZERO,
      light_vector: Vec3::ZERO,
      light_view: Mat4::IDENTITY,
      light_projection: Mat4::IDENTITY,
      cascades: [Vec4::ZERO; CASCADE_COUNT],
      max_region_extent: HALF_REGION * 3f32.sqrt(),
      faces: LIGHT_OCTANT_FACES[0],
      placement: RegionPlacement::default(),
    }
  }

  pub fn raster(&self) -> &R {
    &self.raster
  }

  pub fn raster_mut(&mut self) -> &mut R {
    &mut self.raster
  }

  #[inline]
  pub fn light_vector(&self) -> Vec3 {
    self.light_vector
  }

  #[inline]
  pub fn cascades(&self) -> &[Vec4; CASCADE_COUNT] {
    &self.cascades
  }

  #[inline]
  pub fn max_region_extent(&self) -> f32 {
    self.max_region_extent
  }

  /// Lit faces for the current light direction.
  #[inline]
  pub fn lit_faces(&self) -> BoxFaces {
    self.faces
  }

  /// Take over this frame's shadow state if the view changed or the light
  /// turned noticeably. Returns true when state was copied (and the raster
  /// cleared).
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "shadow_occluder::copy_state"))]
  pub fn copy_state(&mut self, view_version: u64, camera: DVec3, data: &ShadowMatrixData) -> bool {
    let light = data.light_vector.normalize_or_zero();
    let light_turned = 1.0 - self.light_vector.dot(light) > LIGHT_VECTOR_THRESHOLD;
    if self.view_version == Some(view_version) && !light_turned {
      return false;
    }

    self.view_version = Some(view_version);
    self.camera = camera;
    self.light_vector = light;
    self.light_view = data.light_view;
    self.light_projection = data.light_projection;
    self.cascades = data.cascades;
    self.faces = LIGHT_OCTANT_FACES[light_octant(light)];
    self.invalidate();
    self.raster.set_view_projection(self.light_projection * self.light_view);

    #[cfg(feature = "tracing")]
    tracing::debug!(version = self.version, light_turned, "shadow state copied");

    true
  }

  /// Clear the raster without touching the light state.
  pub fn invalidate(&mut self) {
    self.raster.clear();
    self.version += 1;
  }

  /// Index of the smallest cascade holding `region`, or -1 if it casts into
  /// none.
  pub fn cascade(&self, region: IVec3) -> i32 {
    let center = (region_center(region) - self.camera).as_vec3();
    let light_space = self.light_view.transform_point3(center).truncate();
    let extent = Vec2::splat(self.max_region_extent);

    let mut cascade = -1;
    for i in (0..CASCADE_COUNT).rev() {
      let sphere = self.cascades[i];
      let outside = (light_space - sphere.xy()).abs() - Vec2::splat(sphere.w);
      if !outside.cmple(extent).all() {
        break;
      }
      cascade = i as i32;
    }
    cascade
  }
}

impl<R: OcclusionRaster> Occluder for ShadowOccluder<R> {
  #[inline]
  fn version(&self) -> u64 {
    self.version
  }

  fn prepare_region(&mut self, region: IVec3) {
    self.placement = RegionPlacement::new(region, self.camera);
  }

  #[inline]
  fn region_range(&self) -> u32 {
    self.placement.range
  }

  fn is_box_visible(&self, b: PackedBox) -> bool {
    let (min, max) = self.placement.bounds(b);
    self.raster.test_box(min, max, self.faces)
  }

  fn occlude_box(&mut self, b: PackedBox) {
    let (min, max) = self.placement.bounds(b);
    self.raster.draw_box(min, max, self.faces);
  }
}

#[cfg(test)]
#[path = "shadow_test.rs"]
mod shadow_test;
