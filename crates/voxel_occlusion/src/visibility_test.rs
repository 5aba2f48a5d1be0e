use glam::DVec3;

use super::*;
use crate::config::CullingConfig;
use crate::frustum::{MacroVisibilityStore, NoMacroVisibility, TerrainFrustum};
use crate::region::{RegionCompressor, RegionOcclusionData};
use crate::test_utils::RecordingRaster;
use crate::types::OccupancyGrid;

/// Camera in the middle of region (0, 0, 0), looking down -Z.
fn frustum(config: CullingConfig) -> RegionCullingFrustum<NoMacroVisibility> {
  let mut terrain = TerrainFrustum::new(config);
  terrain.prepare(DVec3::new(8.5, 8.5, 8.5), 0.0, 0.0);
  RegionCullingFrustum::new(terrain, NoMacroVisibility)
}

/// Camera region (empty), a full wall ahead, a full region behind the wall,
/// and one behind the camera.
fn regions() -> Vec<Region> {
  let full = Arc::new(RegionCompressor::new().compress(&OccupancyGrid::full()));
  let empty = Arc::new(RegionOcclusionData::empty());
  vec![
    Region::new(IVec3::new(0, 0, -2), full.clone()),
    Region::new(IVec3::new(0, 0, 1), full.clone()),
    Region::new(IVec3::new(0, 0, -1), full),
    Region::new(IVec3::ZERO, empty),
  ]
}

#[test]
fn test_wall_hides_region_behind() {
  let frustum = frustum(CullingConfig::default());
  let mut occluder = TerrainOccluder::new(RecordingRaster::default());
  let mut regions = regions();
  let mut visibility = TerrainVisibility::new();

  let visible = visibility.update(&frustum, &mut occluder, &mut regions).to_vec();
  assert_eq!(visible, vec![IVec3::ZERO, IVec3::new(0, 0, -1)]);

  let stats = *visibility.stats();
  assert_eq!(stats.tested, 4);
  assert_eq!(stats.frustum_culled, 1);
  assert_eq!(stats.occluded, 1);
  assert_eq!(stats.visible, 2);
  assert!(stats.occluders_drawn >= 1);

  // Results are stamped on the records
  assert!(occluder.is_current(&regions[0].record));
  assert!(regions[0].record.occluded);
  assert!(!regions[2].record.occluded);
}

#[test]
fn test_occlusion_disabled_keeps_everything_in_frustum() {
  let frustum = frustum(CullingConfig::default().with_occlusion(false));
  let mut occluder = TerrainOccluder::new(RecordingRaster::default());
  let mut regions = regions();
  let mut visibility = TerrainVisibility::new();

  let visible = visibility.update(&frustum, &mut occluder, &mut regions).to_vec();
  assert_eq!(visible, vec![IVec3::ZERO, IVec3::new(0, 0, -1), IVec3::new(0, 0, -2)]);
  assert!(occluder.raster().drawn.is_empty());
  assert_eq!(occluder.raster().tests.get(), 0);
}

#[test]
fn test_unchanged_frame_is_skipped() {
  let frustum = frustum(CullingConfig::default());
  let mut occluder = TerrainOccluder::new(RecordingRaster::default());
  let mut regions = regions();
  let mut visibility = TerrainVisibility::new();

  visibility.update(&frustum, &mut occluder, &mut regions);
  let tests = occluder.raster().tests.get();
  let drawn = occluder.raster().drawn.len();

  assert_eq!(visibility.update(&frustum, &mut occluder, &mut regions).len(), 2);
  assert_eq!(occluder.raster().tests.get(), tests);
  assert_eq!(occluder.raster().drawn.len(), drawn);

  // Forced rerun still reuses the stamped records
  visibility.invalidate();
  assert_eq!(visibility.update(&frustum, &mut occluder, &mut regions).len(), 2);
  assert_eq!(occluder.raster().tests.get(), tests);
  assert_eq!(occluder.raster().drawn.len(), drawn);
}

#[test]
fn test_rotation_retests_against_fresh_raster() {
  let mut frustum = frustum(CullingConfig::default());
  let mut occluder = TerrainOccluder::new(RecordingRaster::default());
  let mut regions = regions();
  let mut visibility = TerrainVisibility::new();

  visibility.update(&frustum, &mut occluder, &mut regions);
  let tests = occluder.raster().tests.get();
  let version = occluder.version();

  assert!(frustum.terrain_mut().prepare(DVec3::new(8.5, 8.5, 8.5), 0.0, 20.0));
  let visible = visibility.update(&frustum, &mut occluder, &mut regions).to_vec();
  assert_eq!(visible, vec![IVec3::ZERO, IVec3::new(0, 0, -1)]);

  // Wall and the region behind it were tested again, wall redrawn
  assert_eq!(occluder.raster().clears, 2);
  assert!(occluder.version() > version);
  assert_eq!(occluder.raster().tests.get(), tests + 2);
  assert!(!occluder.raster().drawn.is_empty());
  assert!(occluder.is_current(&regions[0].record));
  assert!(regions[0].record.occluded);
}

#[test]
fn test_replaced_data_is_retested() {
  let frustum = frustum(CullingConfig::default());
  let mut occluder = TerrainOccluder::new(RecordingRaster::default());
  let mut regions = regions();
  let mut visibility = TerrainVisibility::new();

  visibility.update(&frustum, &mut occluder, &mut regions);

  // The wall is mined out
  regions[2].set_data(Arc::new(RegionOcclusionData::empty()));
  let tests = occluder.raster().tests.get();
  visibility.update(&frustum, &mut occluder, &mut regions);
  assert_eq!(occluder.raster().tests.get(), tests + 1);
  assert!(!regions[2].record.occluded);
}

#[test]
fn test_movement_clears_raster_and_retests() {
  let mut frustum = frustum(CullingConfig::default());
  let mut occluder = TerrainOccluder::new(RecordingRaster::default());
  let mut regions = regions();
  let mut visibility = TerrainVisibility::new();

  visibility.update(&frustum, &mut occluder, &mut regions);
  let version = occluder.version();

  frustum.terrain_mut().prepare(DVec3::new(10.5, 8.5, 8.5), 0.0, 0.0);
  let visible = visibility.update(&frustum, &mut occluder, &mut regions).to_vec();
  assert!(occluder.version() > version);
  assert_eq!(occluder.raster().clears, 2);
  assert_eq!(visible, vec![IVec3::ZERO, IVec3::new(0, 0, -1)]);
  assert!(occluder.is_current(&regions[0].record));
}

/// Store that reports every macro cell as hidden.
struct Blind;

impl MacroVisibilityStore for Blind {
  fn is_potentially_visible(&self, _cell: IVec3) -> bool {
    false
  }
}

#[test]
fn test_world_height_change_reruns_pass() {
  let config = CullingConfig::default().with_occlusion(false).with_region_culling(true);
  let mut terrain = TerrainFrustum::new(config.clone());
  terrain.prepare(DVec3::new(8.5, 8.5, 8.5), 0.0, 0.0);
  let mut frustum = RegionCullingFrustum::new(terrain, Blind);
  let mut occluder = TerrainOccluder::new(RecordingRaster::default());
  let mut regions = regions();
  let mut visibility = TerrainVisibility::new();

  assert!(visibility.update(&frustum, &mut occluder, &mut regions).is_empty());

  // Regions below the new floor fail open
  frustum.terrain_mut().set_config(config.with_world_height(16, 320));
  let visible = visibility.update(&frustum, &mut occluder, &mut regions).to_vec();
  assert_eq!(visible, vec![IVec3::ZERO, IVec3::new(0, 0, -1), IVec3::new(0, 0, -2)]);
}
