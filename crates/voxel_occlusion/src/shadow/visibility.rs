//! ShadowVisibility - per-frame shadow caster selection.
//!
//! Walks the light-ordered region set, assigns each region a cascade and,
//! unless self-shadow occlusion is disabled, tests it against the shadow
//! raster before drawing its own occluders. Regions nearer the light are
//! visited first, so a region hidden behind an earlier caster along the
//! light is dropped.

use std::sync::Arc;

use glam::{IVec3, Vec3};

use super::region_set::ShadowPotentiallyVisibleRegionSet;
use crate::config::CullingConfig;
use crate::constants::CASCADE_COUNT;
use crate::occluder::{Occluder, OcclusionRaster, ShadowOccluder};
use crate::packed_box::PackedBox;
use crate::region::{Region, RegionOcclusionData, RegionVisibilityRecord};

/// A region that casts into the shadow map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowRegion {
  pub position: IVec3,
  /// Smallest cascade holding the region.
  pub cascade: u8,
}

/// Counts from the last pass that did work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadowVisibilityStats {
  pub tested: u32,
  pub out_of_cascades: u32,
  pub occluded: u32,
  pub visible: u32,
  pub per_cascade: [u32; CASCADE_COUNT],
}

/// What [`ShadowVisibility::set_camera`] did to the tracked set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowSetChange {
  Unchanged,
  /// New light traversal order; ranks moved.
  Reranked,
  /// New camera region; every region was dropped and must be added again.
  Rebased,
}

pub struct ShadowVisibility {
  regions: ShadowPotentiallyVisibleRegionSet<Arc<RegionOcclusionData>>,
  visible: Vec<ShadowRegion>,
  disable_self_shadow_occlusion: bool,
  dirty: bool,
  /// Occluder version the raster held after the last pass.
  last_occluder_version: Option<u64>,
  stats: ShadowVisibilityStats,
}

impl ShadowVisibility {
  /// Track shadow casters within `radius` regions of the camera.
  pub fn new(radius: u32, config: &CullingConfig) -> Self {
    Self {
      regions: ShadowPotentiallyVisibleRegionSet::new(radius),
      visible: Vec::new(),
      disable_self_shadow_occlusion: config.disable_self_shadow_occlusion,
      dirty: true,
      last_occluder_version: None,
      stats: ShadowVisibilityStats::default(),
    }
  }

  pub fn set_config(&mut self, config: &CullingConfig) {
    if config.disable_self_shadow_occlusion != self.disable_self_shadow_occlusion {
      self.disable_self_shadow_occlusion = config.disable_self_shadow_occlusion;
      self.dirty = true;
    }
  }

  pub fn regions(&self) -> &ShadowPotentiallyVisibleRegionSet<Arc<RegionOcclusionData>> {
    &self.regions
  }

  #[inline]
  pub fn stats(&self) -> &ShadowVisibilityStats {
    &self.stats
  }

  /// Visible casters from the last pass.
  #[inline]
  pub fn visible(&self) -> &[ShadowRegion] {
    &self.visible
  }

  /// Re-center on the camera region and re-rank for the light direction.
  ///
  /// The records of `regions` follow the set: cleared on a rebase, given
  /// their new rank on a re-rank.
  pub fn set_camera(
    &mut self,
    camera_region: IVec3,
    light_vector: Vec3,
    regions: &mut [Region],
  ) -> ShadowSetChange {
    let rebased = self.regions.set_origin(camera_region);
    let reranked = self.regions.set_light_vector(light_vector);

    let change = if rebased {
      for region in regions.iter_mut() {
        region.record.clear();
      }
      ShadowSetChange::Rebased
    } else if reranked {
      for region in regions.iter_mut() {
        self.sync_record(region.position, &mut region.record);
      }
      ShadowSetChange::Reranked
    } else {
      return ShadowSetChange::Unchanged;
    };

    self.dirty = true;
    change
  }

  /// Copy the current rank of `position` into `record`, `None` when the
  /// region is not tracked.
  pub fn sync_record(&self, position: IVec3, record: &mut RegionVisibilityRecord) {
    record.shadow_rank = self.regions.get(position).and(self.regions.rank(position));
  }

  /// Register a region as a potential caster. Regions without solid cells
  /// or outside the radius are not tracked; returns whether it was added.
  pub fn add_region(
    &mut self,
    position: IVec3,
    data: Arc<RegionOcclusionData>,
    record: &mut RegionVisibilityRecord,
  ) -> bool {
    if data.is_empty() {
      self.remove_region(position, record);
      return false;
    }
    record.shadow_rank = self.regions.add(position, data);
    self.dirty = true;
    record.shadow_rank.is_some()
  }

  pub fn remove_region(&mut self, position: IVec3, record: &mut RegionVisibilityRecord) -> bool {
    record.shadow_rank = None;
    let removed = self.regions.remove(position).is_some();
    self.dirty |= removed;
    removed
  }

  /// Select this frame's casters. Call after
  /// [`ShadowOccluder::copy_state`]; reuses the previous list when neither
  /// the occluder nor the region set changed.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "shadow_visibility::update"))]
  pub fn update<R: OcclusionRaster>(&mut self, occluder: &mut ShadowOccluder<R>) -> &[ShadowRegion] {
    let raster_holds_last_pass = self.last_occluder_version == Some(occluder.version());
    if raster_holds_last_pass && !self.dirty {
      return &self.visible;
    }
    if raster_holds_last_pass {
      // Casters would otherwise be hidden by their own earlier draws
      occluder.invalidate();
    }

    self.visible.clear();
    let mut stats = ShadowVisibilityStats::default();

    self.regions.rewind();
    while let Some((position, data)) = self.regions.next() {
      stats.tested += 1;

      let cascade = occluder.cascade(position);
      if cascade < 0 {
        stats.out_of_cascades += 1;
        continue;
      }

      if !self.disable_self_shadow_occlusion {
        occluder.prepare_region(position);
        if occluder.is_box_occluded(PackedBox::FULL) {
          stats.occluded += 1;
          continue;
        }
        occluder.occlude_region(data);
      }

      stats.visible += 1;
      stats.per_cascade[cascade as usize] += 1;
      self.visible.push(ShadowRegion {
        position,
        cascade: cascade as u8,
      });
    }

    self.last_occluder_version = Some(occluder.version());
    self.dirty = false;
    self.stats = stats;

    #[cfg(feature = "tracing")]
    tracing::debug!(
      tested = stats.tested,
      occluded = stats.occluded,
      visible = stats.visible,
      "shadow visibility updated"
    );

    &self.visible
  }
}

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;
