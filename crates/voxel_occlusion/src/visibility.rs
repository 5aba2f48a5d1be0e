//! TerrainVisibility - per-frame camera visibility pass.
//!
//! ```text
//! candidates ──sort front-to-back──▶ frustum (+ macro gate) ──▶ occluder
//!                                         │ culled                │ occluded
//!                                         ▼                       ▼
//!                                       dropped                dropped
//!                                                              visible: draw
//!                                                              own boxes, emit
//! ```
//!
//! Nearer regions are drawn into the raster before farther ones are tested.
//! Each region's record caches the occluder result for the current raster
//! contents, so a camera rotation inside the dead zone reruns only the
//! frustum test.

use std::sync::Arc;

use glam::IVec3;

use crate::config::CullingConfig;
use crate::frustum::{MacroVisibilityStore, RegionCullingFrustum};
use crate::occluder::{Occluder, OcclusionRaster, TerrainOccluder};
use crate::packed_box::PackedBox;
use crate::region::{block_to_region, Region, RegionOcclusionData};

/// Counts from the last pass that did work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainVisibilityStats {
  pub tested: u32,
  pub frustum_culled: u32,
  pub occluded: u32,
  pub visible: u32,
  /// Boxes and planes rasterized this pass.
  pub occluders_drawn: u32,
}

#[derive(Default)]
pub struct TerrainVisibility {
  order: Vec<usize>,
  visible: Vec<IVec3>,
  last_inputs: Option<PassInputs>,
  stats: TerrainVisibilityStats,
}

impl TerrainVisibility {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn stats(&self) -> &TerrainVisibilityStats {
    &self.stats
  }

  /// Visible regions from the last pass, front to back.
  #[inline]
  pub fn visible(&self) -> &[IVec3] {
    &self.visible
  }

  /// Force the next [`update`](Self::update) to run, e.g. after the macro
  /// visibility store changed.
  pub fn invalidate(&mut self) {
    self.last_inputs = None;
  }

  /// Visible regions out of `regions`, front to back.
  ///
  /// Call after [`TerrainFrustum::prepare`](crate::frustum::TerrainFrustum::prepare).
  /// Returns the previous result untouched when the frustum versions, the
  /// occluder version, the configuration and the candidate set all match
  /// the last pass.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "terrain_visibility::update"))]
  pub fn update<S, R>(
    &mut self,
    frustum: &RegionCullingFrustum<S>,
    occluder: &mut TerrainOccluder<R>,
    regions: &mut [Region],
  ) -> &[IVec3]
  where
    S: MacroVisibilityStore,
    R: OcclusionRaster,
  {
    let terrain = frustum.terrain();
    occluder.prepare(terrain);

    let occluder_version = occluder.version();
    match self.last_inputs.as_mut() {
      Some(inputs) if inputs.matches(frustum, occluder_version, regions) => return &self.visible,
      Some(inputs) => inputs.capture(frustum, occluder_version, regions),
      None => self.last_inputs = Some(PassInputs::new(frustum, occluder_version, regions)),
    }

    let camera_region = block_to_region(terrain.position().floor().as_ivec3());
    self.order.clear();
    self.order.extend(0..regions.len());
    self.order.sort_unstable_by_key(|&i| {
      let position = regions[i].position;
      ((position - camera_region).length_squared(), position.to_array())
    });

    let occlusion_enabled = terrain.config().occlusion_enabled;
    let mut stats = TerrainVisibilityStats::default();
    self.visible.clear();

    for &index in &self.order {
      let region = &mut regions[index];
      stats.tested += 1;

      if !frustum.is_region_visible(region.position) {
        stats.frustum_culled += 1;
        continue;
      }

      if occlusion_enabled {
        let occluded = if occluder.is_current(&region.record) {
          region.record.occluded
        } else {
          occluder.prepare_region(region.position);
          let occluded = occluder.is_box_occluded(PackedBox::FULL);
          if !occluded {
            stats.occluders_drawn += occluder.occlude_region(&region.data) as u32;
          }
          occluder.stamp(&mut region.record, occluded);
          occluded
        };
        if occluded {
          stats.occluded += 1;
          continue;
        }
      }

      stats.visible += 1;
      self.visible.push(region.position);
    }

    self.stats = stats;

    #[cfg(feature = "tracing")]
    tracing::debug!(
      tested = stats.tested,
      frustum_culled = stats.frustum_culled,
      occluded = stats.occluded,
      visible = stats.visible,
      "terrain visibility updated"
    );

    &self.visible
  }
}

/// Everything a pass result depends on, as of the last pass that did work.
///
/// Region data is held by `Arc` and compared by pointer, so a rebuilt
/// region never matches its predecessor.
struct PassInputs {
  view_version: u64,
  occluder_version: u64,
  config: CullingConfig,
  regions: Vec<(IVec3, Arc<RegionOcclusionData>)>,
}

impl PassInputs {
  fn new<S: MacroVisibilityStore>(
    frustum: &RegionCullingFrustum<S>,
    occluder_version: u64,
    regions: &[Region],
  ) -> Self {
    let terrain = frustum.terrain();
    Self {
      view_version: terrain.view_version(),
      occluder_version,
      config: terrain.config().clone(),
      regions: regions.iter().map(|r| (r.position, r.data.clone())).collect(),
    }
  }

  fn matches<S: MacroVisibilityStore>(
    &self,
    frustum: &RegionCullingFrustum<S>,
    occluder_version: u64,
    regions: &[Region],
  ) -> bool {
    let terrain = frustum.terrain();
    self.view_version == terrain.view_version()
      && self.occluder_version == occluder_version
      && self.config == *terrain.config()
      && self.regions.len() == regions.len()
      && self
        .regions
        .iter()
        .zip(regions)
        .all(|((position, data), region)| *position == region.position && Arc::ptr_eq(data, &region.data))
  }

  /// Overwrite in place, keeping the region buffer.
  fn capture<S: MacroVisibilityStore>(
    &mut self,
    frustum: &RegionCullingFrustum<S>,
    occluder_version: u64,
    regions: &[Region],
  ) {
    let terrain = frustum.terrain();
    self.view_version = terrain.view_version();
    self.occluder_version = occluder_version;
    self.config.clone_from(terrain.config());
    self.regions.clear();
    self.regions.extend(regions.iter().map(|r| (r.position, r.data.clone())));
  }
}

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;
