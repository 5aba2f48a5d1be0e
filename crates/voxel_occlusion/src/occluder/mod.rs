//! Occluders: compressed region geometry drawn into, and tested against, an
//! external software raster.
//!
//! # Module Structure
//!
//! - [`OcclusionRaster`]: contract of the external rasterizer
//! - [`Occluder`]: what the visibility passes drive
//! - [`terrain`]: `TerrainOccluder` - camera occluder
//! - [`shadow`]: `ShadowOccluder` - orthographic light occluder + cascades
//!
//! Boxes arrive in region-local [`PackedBox`] form and are placed in
//! camera-relative `f32` space before reaching the raster.

pub mod shadow;
pub mod terrain;

pub use shadow::{ShadowMatrixData, ShadowOccluder, LIGHT_OCTANT_FACES};
pub use terrain::TerrainOccluder;

use std::ops::{BitOr, BitOrAssign};

use glam::{DVec3, IVec3, Vec3};

use crate::packed_box::PackedBox;
use crate::region::{region_center, region_origin, RegionOcclusionData};

/// Set of box faces to rasterize or test.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoxFaces(u8);

impl BoxFaces {
  pub const NONE: Self = Self(0);
  pub const NEG_X: Self = Self(1 << 0);
  pub const POS_X: Self = Self(1 << 1);
  pub const NEG_Y: Self = Self(1 << 2);
  pub const POS_Y: Self = Self(1 << 3);
  pub const NEG_Z: Self = Self(1 << 4);
  pub const POS_Z: Self = Self(1 << 5);
  pub const ALL: Self = Self(0b11_1111);

  #[inline]
  pub const fn bits(self) -> u8 {
    self.0
  }

  #[inline]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  #[inline]
  pub const fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }

  #[inline]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  /// Faces of `min..max` visible from `eye`. Empty when `eye` is inside.
  pub fn facing(min: Vec3, max: Vec3, eye: Vec3) -> Self {
    let mut faces = Self::NONE;
    if eye.x < min.x {
      faces |= Self::NEG_X;
    } else if eye.x > max.x {
      faces |= Self::POS_X;
    }
    if eye.y < min.y {
      faces |= Self::NEG_Y;
    } else if eye.y > max.y {
      faces |= Self::POS_Y;
    }
    if eye.z < min.z {
      faces |= Self::NEG_Z;
    } else if eye.z > max.z {
      faces |= Self::POS_Z;
    }
    faces
  }
}

impl BitOr for BoxFaces {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self {
    self.union(rhs)
  }
}

impl BitOrAssign for BoxFaces {
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

impl std::fmt::Debug for BoxFaces {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "BoxFaces({:06b})", self.0)
  }
}

/// External software rasterizer (depth-only occlusion buffer).
///
/// Coordinates are camera-relative; `min`/`max` are box corners.
pub trait OcclusionRaster {
  /// Drop all drawn occluders.
  fn clear(&mut self);

  /// New camera-relative view-projection. Rasters that store
  /// orientation-dependent data should clear themselves here.
  fn set_view_projection(&mut self, view_projection: glam::Mat4);

  fn draw_box(&mut self, min: Vec3, max: Vec3, faces: BoxFaces);

  /// True if any part of the given faces may be visible.
  fn test_box(&self, min: Vec3, max: Vec3, faces: BoxFaces) -> bool;
}

/// Raster that draws nothing; every box is visible.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRaster;

impl OcclusionRaster for NullRaster {
  fn clear(&mut self) {}

  fn set_view_projection(&mut self, _view_projection: glam::Mat4) {}

  fn draw_box(&mut self, _min: Vec3, _max: Vec3, _faces: BoxFaces) {}

  fn test_box(&self, _min: Vec3, _max: Vec3, _faces: BoxFaces) -> bool {
    true
  }
}

/// Interface the visibility passes drive, per region:
/// `prepare_region`, then box tests, then `occlude_region` if visible.
pub trait Occluder {
  /// Bumped whenever the underlying raster is cleared.
  fn version(&self) -> u64;

  /// Select the region subsequent box calls refer to.
  fn prepare_region(&mut self, region: IVec3);

  /// Distance class of the prepared region.
  fn region_range(&self) -> u32;

  fn is_box_visible(&self, b: PackedBox) -> bool;

  #[inline]
  fn is_box_occluded(&self, b: PackedBox) -> bool {
    !self.is_box_visible(b)
  }

  fn occlude_box(&mut self, b: PackedBox);

  /// Draw every box and plane of `data` worth drawing at the prepared
  /// region's range. Returns the number drawn.
  fn occlude_region(&mut self, data: &RegionOcclusionData) -> usize {
    let range = self.region_range();
    let mut drawn = 0;
    for b in data.occluders_for_range(range) {
      self.occlude_box(b);
      drawn += 1;
    }
    drawn
  }
}

/// A region placed relative to the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegionPlacement {
  pub region: IVec3,
  /// Camera-relative minimum corner.
  pub origin: Vec3,
  pub range: u32,
}

impl RegionPlacement {
  pub fn new(region: IVec3, camera: DVec3) -> Self {
    let origin = (region_origin(region).as_dvec3() - camera).as_vec3();
    let offset = (region_center(region) - camera.floor()).as_i64vec3();
    let square_dist = offset.length_squared().min(i32::MAX as i64) as i32;
    Self {
      region,
      origin,
      range: PackedBox::range_from_square_block_dist(square_dist),
    }
  }

  /// Camera-relative corners of a region-local box.
  #[inline]
  pub fn bounds(&self, b: PackedBox) -> (Vec3, Vec3) {
    let min = Vec3::new(b.x0() as f32, b.y0() as f32, b.z0() as f32);
    let max = Vec3::new(b.x1() as f32, b.y1() as f32, b.z1() as f32);
    (self.origin + min, self.origin + max)
  }
}
