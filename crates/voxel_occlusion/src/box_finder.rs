//! BoxFinder - greedy 3-D box decomposition of a region's occupancy.
//!
//! Produces a list of [`PackedBox`] entries that are pairwise disjoint and
//! whose union is exactly the set of solid cells.
//!
//! # Passes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PASS 1: Sections                            │
//! │  Per Z-slice, pick disjoint solid 4-aligned sections            │
//! │  (mark_section_slices). For each section, largest first, emit   │
//! │  one box per contiguous Z-run where the section is solid and    │
//! │  additive to the filled mask.                                   │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PASS 2: General (repeats)                   │
//! │  remaining = solid & !filled                                    │
//! │  Per slice, decompose remaining into maximal rectangles         │
//! │  (mark_box_slices), stretch each through neighbouring slices    │
//! │  where it stays solid (mark_box_neighbor_slices), sort by       │
//! │  volume and accept every candidate that misses the filled mask. │
//! │  Repeat until the solid-cell counter reaches zero.              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every round of pass 2 accepts at least its largest candidate, so the
//! loop always terminates with full coverage.

use crate::area::{catalog, AreaFinder};
use crate::constants::{REGION_SIZE, SLICE_WORDS};
use crate::packed_box::PackedBox;
use crate::types::OccupancyGrid;

/// Section runs smaller than this are left to the general pass.
const MIN_SECTION_VOLUME: u32 = 128;

// Candidate key layout (sorted descending):
//   bits 32..45  volume
//   bits 16..31  !area index   (smaller index wins ties)
//   bits  8..15  !z0           (lower start wins ties)
//   bits  0..7   z1 (exclusive)
const VOLUME_SHIFT: u32 = 32;
const AREA_SHIFT: u32 = 16;
const Z0_SHIFT: u32 = 8;

#[inline(always)]
fn candidate_key(volume: u32, area_index: u16, z0: u32, z1: u32) -> u64 {
  ((volume as u64) << VOLUME_SHIFT)
    | (((!area_index) as u64) << AREA_SHIFT)
    | (((!z0 & 0xFF) as u64) << Z0_SHIFT)
    | z1 as u64
}

#[inline(always)]
fn decode_candidate(key: u64) -> (u16, u32, u32) {
  let area_index = !((key >> AREA_SHIFT) as u16);
  let z0 = !((key >> Z0_SHIFT) as u32) & 0xFF;
  let z1 = (key & 0xFF) as u32;
  (area_index, z0, z1)
}

/// Reusable scratch state for box decomposition.
///
/// One instance per worker thread; [`BoxFinder::find`] overwrites all state.
pub struct BoxFinder {
  area_finder: AreaFinder,
  solid: [[u64; SLICE_WORDS]; REGION_SIZE],
  filled: [[u64; SLICE_WORDS]; REGION_SIZE],
  remaining: [[u64; SLICE_WORDS]; REGION_SIZE],
  /// Per section (catalog order), the Z-slices where it was chosen.
  section_slices: Vec<u16>,
  slice_areas: Vec<u16>,
  candidates: Vec<u64>,
  /// Solid cells not yet covered by an emitted box.
  voxel_count: u32,
  boxes: Vec<PackedBox>,
}

impl Default for BoxFinder {
  fn default() -> Self {
    Self::new()
  }
}

impl BoxFinder {
  pub fn new() -> Self {
    Self {
      area_finder: AreaFinder::new(),
      solid: [[0; SLICE_WORDS]; REGION_SIZE],
      filled: [[0; SLICE_WORDS]; REGION_SIZE],
      remaining: [[0; SLICE_WORDS]; REGION_SIZE],
      section_slices: vec![0; crate::area::SECTION_COUNT],
      slice_areas: Vec::with_capacity(64),
      candidates: Vec::with_capacity(256),
      voxel_count: 0,
      boxes: Vec::with_capacity(32),
    }
  }

  /// Boxes from the last call to [`find`](Self::find).
  #[inline]
  pub fn boxes(&self) -> &[PackedBox] {
    &self.boxes
  }

  /// Decompose `grid` into disjoint boxes, largest first.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "box_finder::find"))]
  pub fn find(&mut self, grid: &OccupancyGrid) -> &[PackedBox] {
    self.boxes.clear();
    self.solid = *grid.slices();
    self.filled = [[0; SLICE_WORDS]; REGION_SIZE];
    self.voxel_count = grid.solid_count();

    if self.voxel_count == 0 {
      return &self.boxes;
    }

    self.mark_section_slices();
    self.emit_section_boxes();

    while self.voxel_count > 0 {
      self.compute_remaining();
      self.mark_box_slices();
      self.mark_box_neighbor_slices();
      self.accept_candidates();
    }

    &self.boxes
  }

  /// Record, per section, the slices where the section was picked.
  fn mark_section_slices(&mut self) {
    self.section_slices.fill(0);
    let catalog = catalog();

    for z in 0..REGION_SIZE {
      self.slice_areas.clear();
      self.area_finder.find_sections(&self.solid[z], &mut self.slice_areas);
      for &index in &self.slice_areas {
        if let Some(ordinal) = catalog.section_ordinal(index) {
          self.section_slices[ordinal] |= 1 << z;
        }
      }
    }
  }

  fn emit_section_boxes(&mut self) {
    let catalog = catalog();
    for (ordinal, section) in catalog.sections().enumerate() {
      let slices = self.section_slices[ordinal];
      if slices == 0 {
        continue;
      }

      let mut z = 0;
      while z < REGION_SIZE {
        if slices & (1 << z) == 0 || !section.is_additive(&self.filled[z]) {
          z += 1;
          continue;
        }

        let z0 = z;
        while z < REGION_SIZE && slices & (1 << z) != 0 && section.is_additive(&self.filled[z]) {
          z += 1;
        }

        let volume = section.size as u32 * (z - z0) as u32;
        if volume >= MIN_SECTION_VOLUME {
          self.accept(section.index, z0 as u32, z as u32);
        }
      }
    }
  }

  fn compute_remaining(&mut self) {
    for z in 0..REGION_SIZE {
      for w in 0..SLICE_WORDS {
        self.remaining[z][w] = self.solid[z][w] & !self.filled[z][w];
      }
    }
  }

  /// Decompose every slice's remaining cells into maximal rectangles.
  fn mark_box_slices(&mut self) {
    self.candidates.clear();
    for z in 0..REGION_SIZE {
      if self.remaining[z] == [0; SLICE_WORDS] {
        continue;
      }
      self.slice_areas.clear();
      self.area_finder.find(&self.remaining[z], &mut self.slice_areas);
      for &index in &self.slice_areas {
        // Provisional single-slice span, widened below
        self.candidates.push(candidate_key(0, index, z as u32, z as u32 + 1));
      }
    }
  }

  /// Stretch each rectangle through adjacent slices where it stays fully
  /// uncovered-solid, then compute volumes and sort.
  fn mark_box_neighbor_slices(&mut self) {
    let catalog = catalog();
    for candidate in self.candidates.iter_mut() {
      let (index, z, _) = decode_candidate(*candidate);
      let area = catalog.get(index);

      let mut z0 = z;
      while z0 > 0 && area.is_included_by(&self.remaining[z0 as usize - 1]) {
        z0 -= 1;
      }
      let mut z1 = z + 1;
      while (z1 as usize) < REGION_SIZE && area.is_included_by(&self.remaining[z1 as usize]) {
        z1 += 1;
      }

      *candidate = candidate_key(area.size as u32 * (z1 - z0), index, z0, z1);
    }

    self.candidates.sort_unstable_by(|a, b| b.cmp(a));
    self.candidates.dedup();
  }

  fn accept_candidates(&mut self) {
    let catalog = catalog();
    for i in 0..self.candidates.len() {
      if self.voxel_count == 0 {
        break;
      }
      let (index, z0, z1) = decode_candidate(self.candidates[i]);
      let area = catalog.get(index);
      let clear = (z0..z1).all(|z| !area.intersects(&self.filled[z as usize]));
      if clear {
        self.accept(index, z0, z1);
      }
    }
  }

  /// Emit a box for `area` spanning `z0..z1` and mark its cells filled.
  fn accept(&mut self, area_index: u16, z0: u32, z1: u32) {
    let area = catalog().get(area_index);
    let volume = area.size as u32 * (z1 - z0);
    assert!(
      volume <= self.voxel_count,
      "box volume {} exceeds uncovered solid cells {}",
      volume,
      self.voxel_count
    );

    for z in z0..z1 {
      area.set_bits(&mut self.filled[z as usize]);
    }
    self.voxel_count -= volume;

    self.boxes.push(PackedBox::with_face_range(
      area.x0 as u32,
      area.y0 as u32,
      z0,
      area.x1 as u32 + 1,
      area.y1 as u32 + 1,
      z1,
    ));
  }
}

#[cfg(test)]
#[path = "box_finder_test.rs"]
mod box_finder_test;
