//! PlaneFinder - large 1-cell-thick occluder walls near a region's middle.
//!
//! For each axis the grid is re-sliced so that axis becomes the slice axis,
//! then the area catalog is walked largest first against the two middle
//! slices. Every rectangle fully solid on one of them (and not overlapping an
//! earlier plane's footprint) becomes a plane.
//!
//! # Slice coordinates per axis
//!
//! ```text
//! axis │ slice index │ u (bit column) │ v (row)
//! ─────┼─────────────┼────────────────┼────────
//!   Z  │      z      │       x        │   y      identity
//!   Y  │      y      │       x        │   z      row permutation
//!   X  │      x      │       z        │   y      16×16 bit transpose per y
//! ```

use smallvec::SmallVec;

use crate::area::catalog;
use crate::constants::{slice_row, MIN_PLANE_AREA, REGION_SIZE, SLICE_WORDS};
use crate::packed_box::PackedBox;
use crate::types::{Axis, OccupancyGrid};

/// Depths searched for planes, in priority order.
pub const MID_SLICES: [usize; 2] = [REGION_SIZE / 2, REGION_SIZE / 2 - 1];

type Slices = [[u64; SLICE_WORDS]; REGION_SIZE];

/// Planes found for one region, grouped by the axis they face along.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaneSet {
  planes: [SmallVec<[PackedBox; 4]>; 3],
}

impl PlaneSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Planes perpendicular to `axis`.
  #[inline]
  pub fn get(&self, axis: Axis) -> &[PackedBox] {
    &self.planes[axis.index()]
  }

  pub fn push(&mut self, axis: Axis, plane: PackedBox) {
    self.planes[axis.index()].push(plane);
  }

  pub fn len(&self) -> usize {
    self.planes.iter().map(|p| p.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.planes.iter().all(|p| p.is_empty())
  }

  pub fn clear(&mut self) {
    for planes in &mut self.planes {
      planes.clear();
    }
  }

  /// All planes with their axis, X first.
  pub fn iter(&self) -> impl Iterator<Item = (Axis, PackedBox)> + '_ {
    Axis::ALL
      .into_iter()
      .flat_map(move |axis| self.get(axis).iter().map(move |&p| (axis, p)))
  }
}

/// Transpose a 16×16 bit matrix in place: bit `c` of `rows[r]` moves to bit
/// `r` of `rows[c]`.
pub fn transpose16(rows: &mut [u16; 16]) {
  let mut j = 8;
  let mut mask: u16 = 0x00FF;
  while j != 0 {
    let mut k = 0;
    while k < 16 {
      let t = ((rows[k] >> j) ^ rows[k + j]) & mask;
      rows[k + j] ^= t;
      rows[k] ^= t << j;
      k = (k + j + 1) & !j;
    }
    j >>= 1;
    mask ^= mask << j;
  }
}

/// Re-slice `grid` so `axis` is the slice axis (see module docs).
pub fn transpose_grid(grid: &OccupancyGrid, axis: Axis, out: &mut Slices) {
  match axis {
    Axis::Z => *out = *grid.slices(),
    Axis::Y => {
      *out = [[0; SLICE_WORDS]; REGION_SIZE];
      for (z, slice) in grid.slices().iter().enumerate() {
        for (y, dst) in out.iter_mut().enumerate() {
          dst[z >> 2] |= (slice_row(slice, y) as u64) << ((z & 3) << 4);
        }
      }
    }
    Axis::X => {
      *out = [[0; SLICE_WORDS]; REGION_SIZE];
      let mut rows = [0u16; 16];
      for y in 0..REGION_SIZE {
        for (z, row) in rows.iter_mut().enumerate() {
          *row = slice_row(grid.slice(z), y);
        }
        transpose16(&mut rows);
        // rows[x] now holds bit z for each z
        for (x, dst) in out.iter_mut().enumerate() {
          dst[y >> 2] |= (rows[x] as u64) << ((y & 3) << 4);
        }
      }
    }
  }
}

/// Map an in-slice rectangle (inclusive `u`/`v` bounds) at `depth` back to a
/// region-space plane box.
fn plane_box(axis: Axis, depth: u32, u0: u32, v0: u32, u1: u32, v1: u32) -> PackedBox {
  let (d0, d1) = (depth, depth + 1);
  let (u1, v1) = (u1 + 1, v1 + 1);
  match axis {
    Axis::Z => PackedBox::with_face_range(u0, v0, d0, u1, v1, d1),
    Axis::Y => PackedBox::with_face_range(u0, d0, v0, u1, d1, v1),
    Axis::X => PackedBox::with_face_range(d0, v0, u0, d1, v1, u1),
  }
}

/// Reusable scratch for plane extraction; one per worker thread.
pub struct PlaneFinder {
  transposed: Slices,
  filled: [u64; SLICE_WORDS],
  planes: PlaneSet,
}

impl Default for PlaneFinder {
  fn default() -> Self {
    Self::new()
  }
}

impl PlaneFinder {
  pub fn new() -> Self {
    Self {
      transposed: [[0; SLICE_WORDS]; REGION_SIZE],
      filled: [0; SLICE_WORDS],
      planes: PlaneSet::new(),
    }
  }

  /// Planes from the last call to [`find`](Self::find).
  #[inline]
  pub fn planes(&self) -> &PlaneSet {
    &self.planes
  }

  /// Find occluder planes along all three axes.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "plane_finder::find"))]
  pub fn find(&mut self, grid: &OccupancyGrid) -> &PlaneSet {
    self.planes.clear();
    if grid.is_empty() {
      return &self.planes;
    }

    for axis in Axis::ALL {
      transpose_grid(grid, axis, &mut self.transposed);
      self.find_axis(axis);
    }
    &self.planes
  }

  fn find_axis(&mut self, axis: Axis) {
    let [first, second] = MID_SLICES;
    let (a, b) = (self.transposed[first], self.transposed[second]);

    let mut open: u32 = (0..SLICE_WORDS).map(|w| (a[w] | b[w]).count_ones()).sum();
    self.filled = [0; SLICE_WORDS];

    for area in catalog().iter() {
      let size = area.size as u32;
      if size < MIN_PLANE_AREA || open < MIN_PLANE_AREA {
        break;
      }
      if size > open || area.intersects(&self.filled) {
        continue;
      }

      let depth = if area.is_included_by(&a) {
        first
      } else if area.is_included_by(&b) {
        second
      } else {
        continue;
      };

      area.set_bits(&mut self.filled);
      open -= size;
      self.planes.push(
        axis,
        plane_box(
          axis,
          depth as u32,
          area.x0 as u32,
          area.y0 as u32,
          area.x1 as u32,
          area.y1 as u32,
        ),
      );
    }
  }
}

#[cfg(test)]
#[path = "plane_finder_test.rs"]
mod plane_finder_test;
