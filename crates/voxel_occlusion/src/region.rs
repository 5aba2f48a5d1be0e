//! Per-region compressed occluder data and visibility bookkeeping.
//!
//! Region positions are `IVec3` region coordinates (block coordinate
//! `>> 4`).

use std::sync::Arc;

use glam::{DVec3, IVec3};
use smallvec::SmallVec;

use crate::box_finder::BoxFinder;
use crate::constants::{REGION_SHIFT, REGION_SIZE};
use crate::packed_box::PackedBox;
use crate::plane_finder::{PlaneFinder, PlaneSet};
use crate::types::OccupancyGrid;

/// Block-space minimum corner of a region.
#[inline]
pub fn region_origin(region: IVec3) -> IVec3 {
  region << REGION_SHIFT as i32
}

/// Block-space center of a region.
#[inline]
pub fn region_center(region: IVec3) -> DVec3 {
  region_origin(region).as_dvec3() + DVec3::splat(REGION_SIZE as f64 * 0.5)
}

/// Region containing a block.
#[inline]
pub fn block_to_region(block: IVec3) -> IVec3 {
  block >> REGION_SHIFT as i32
}

/// Compressed occluder geometry of one region.
///
/// Written once by a worker, then shared read-only with the render thread.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionOcclusionData {
  /// Disjoint boxes covering every solid cell, largest first.
  pub boxes: SmallVec<[PackedBox; 8]>,
  pub planes: PlaneSet,
  pub solid_count: u32,
}

impl RegionOcclusionData {
  /// Data for a region with no solid cells.
  pub fn empty() -> Self {
    Self::default()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.solid_count == 0
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.boxes.len() == 1 && self.boxes[0] == PackedBox::FULL
  }

  /// Boxes and planes worth drawing for a region in range class `range`.
  pub fn occluders_for_range(&self, range: u32) -> impl Iterator<Item = PackedBox> + '_ {
    self
      .boxes
      .iter()
      .copied()
      .chain(self.planes.iter().map(|(_, plane)| plane))
      .filter(move |b| b.range() >= range)
  }
}

/// Owns one [`BoxFinder`] and one [`PlaneFinder`]. Give each worker thread
/// its own instance.
#[derive(Default)]
pub struct RegionCompressor {
  boxes: BoxFinder,
  planes: PlaneFinder,
}

impl RegionCompressor {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "region::compress"))]
  pub fn compress(&mut self, grid: &OccupancyGrid) -> RegionOcclusionData {
    let solid_count = grid.solid_count();
    if solid_count == 0 {
      return RegionOcclusionData::empty();
    }

    let boxes = SmallVec::from_slice(self.boxes.find(grid));
    let planes = self.planes.find(grid).clone();

    #[cfg(feature = "tracing")]
    tracing::trace!(solid_count, boxes = boxes.len(), planes = planes.len(), "compressed region");

    RegionOcclusionData {
      boxes,
      planes,
      solid_count,
    }
  }
}

/// Per-region visibility state, owned by the region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionVisibilityRecord {
  /// Occluder version this region was last tested (and, if visible,
  /// rasterized) under. Zero means never.
  pub occluder_version: u64,
  /// Result of that test.
  pub occluded: bool,
  /// Rank in the shadow traversal order, if registered there.
  pub shadow_rank: Option<u32>,
}

impl RegionVisibilityRecord {
  pub fn new() -> Self {
    Self::default()
  }

  /// Forget all cached state (coordinate rebase or unload).
  pub fn clear(&mut self) {
    *self = Self::default();
  }
}

/// A candidate region as handed to the visibility passes.
#[derive(Clone, Debug)]
pub struct Region {
  pub position: IVec3,
  pub data: Arc<RegionOcclusionData>,
  pub record: RegionVisibilityRecord,
}

impl Region {
  pub fn new(position: IVec3, data: Arc<RegionOcclusionData>) -> Self {
    Self {
      position,
      data,
      record: RegionVisibilityRecord::new(),
    }
  }

  /// Swap in rebuilt data. Occluder results cached for the old data are
  /// dropped; the shadow rank depends only on position and is kept.
  pub fn set_data(&mut self, data: Arc<RegionOcclusionData>) {
    self.data = data;
    self.record.occluder_version = 0;
    self.record.occluded = false;
  }
}

#[cfg(test)]
#[path = "region_test.rs"]
mod region_test;
