//! TerrainOccluder - camera occluder over an external raster.
//!
//! The raster survives across frames while the frustum's view version is
//! unchanged; the frustum's dead zones bound how often that happens. Regions
//! are stamped with the occluder version they were tested under, so a region
//! tested (and, if visible, drawn) since the last clear is neither retested
//! nor redrawn.

use glam::{DVec3, IVec3, Vec3};

use super::{BoxFaces, OcclusionRaster, Occluder, RegionPlacement};
use crate::frustum::TerrainFrustum;
use crate::packed_box::PackedBox;
use crate::region::{block_to_region, RegionVisibilityRecord};

pub struct TerrainOccluder<R> {
  raster: R,
  version: u64,
  view_version: Option<u64>,
  camera: DVec3,
  camera_region: IVec3,
  near_occluders: bool,
  placement: RegionPlacement,
  /// Prepared region is adjacent to the camera and near occluders are off.
  skip_drawing: bool,
}

impl<R: OcclusionRaster> TerrainOccluder<R> {
  pub fn new(raster: R) -> Self {
    Self {
      raster,
      version: 0,
      view_version: None,
      camera: DVec3::ZERO,
      camera_region: IVec3::ZERO,
      near_occluders: true,
      placement: RegionPlacement::default(),
      skip_drawing: false,
    }
  }

  pub fn raster(&self) -> &R {
    &self.raster
  }

  pub fn raster_mut(&mut self) -> &mut R {
    &mut self.raster
  }

  /// Camera position the raster contents are relative to.
  #[inline]
  pub fn camera(&self) -> DVec3 {
    self.camera
  }

  /// Sync with the frustum. Any new view version clears the raster and
  /// starts a new occluder version. Returns true if the raster was cleared.
  pub fn prepare(&mut self, frustum: &TerrainFrustum) -> bool {
    self.near_occluders = frustum.config().near_occluders;

    if self.view_version == Some(frustum.view_version()) {
      return false;
    }
    self.view_version = Some(frustum.view_version());
    self.camera = frustum.position();
    self.camera_region = block_to_region(self.camera.floor().as_ivec3());
    self.raster.clear();
    self.raster.set_view_projection(frustum.view_projection());
    self.version += 1;

    #[cfg(feature = "tracing")]
    tracing::debug!(version = self.version, "terrain occluder cleared");

    true
  }

  /// True if `record` was tested under the current raster contents.
  #[inline]
  pub fn is_current(&self, record: &RegionVisibilityRecord) -> bool {
    record.occluder_version == self.version
  }

  /// Remember the test result for the current raster contents.
  #[inline]
  pub fn stamp(&self, record: &mut RegionVisibilityRecord, occluded: bool) {
    record.occluder_version = self.version;
    record.occluded = occluded;
  }

  #[inline]
  fn faces(min: Vec3, max: Vec3) -> BoxFaces {
    BoxFaces::facing(min, max, Vec3::ZERO)
  }
}

impl<R: OcclusionRaster> Occluder for TerrainOccluder<R> {
  #[inline]
  fn version(&self) -> u64 {
    self.version
  }

  fn prepare_region(&mut self, region: IVec3) {
    self.placement = RegionPlacement::new(region, self.camera);
    let offset = (region - self.camera_region).abs();
    self.skip_drawing = !self.near_occluders && offset.max_element() <= 1;
  }

  #[inline]
  fn region_range(&self) -> u32 {
    self.placement.range
  }

  fn is_box_visible(&self, b: PackedBox) -> bool {
    let (min, max) = self.placement.bounds(b);
    let faces = Self::faces(min, max);
    // Camera inside the box
    if faces.is_empty() {
      return true;
    }
    self.raster.test_box(min, max, faces)
  }

  fn occlude_box(&mut self, b: PackedBox) {
    if self.skip_drawing {
      return;
    }
    let (min, max) = self.placement.bounds(b);
    let faces = Self::faces(min, max);
    if !faces.is_empty() {
      self.raster.draw_box(min, max, faces);
    }
  }
}

#[cfg(test)]
#[path = "terrain_test.rs"]
mod terrain_test;
