//! PackedBox - a region-local box plus range class in one `u32`.
//!
//! ```text
//! bit:  31 30 29   25 24   20 19   15 14   10 9     5 4     0
//!      ┌─────┬───────┬───────┬───────┬───────┬───────┬───────┐
//!      │range│  z1   │  y1   │  x1   │  z0   │  y0   │  x0   │
//!      └─────┴───────┴───────┴───────┴───────┴───────┴───────┘
//! ```
//!
//! Coordinates are cell-corner coordinates in 0..=16; the max corner is
//! exclusive, so a single cell at the origin is `(0,0,0)-(1,1,1)`.

use crate::constants::{RANGE_FAR_BLOCKS, RANGE_MID_BLOCKS, RANGE_NEAR_BLOCKS};

const COORD_BITS: u32 = 5;
const COORD_MASK: u32 = (1 << COORD_BITS) - 1;

const X0_SHIFT: u32 = 0;
const Y0_SHIFT: u32 = 5;
const Z0_SHIFT: u32 = 10;
const X1_SHIFT: u32 = 15;
const Y1_SHIFT: u32 = 20;
const Z1_SHIFT: u32 = 25;
const RANGE_SHIFT: u32 = 30;

/// Bit-packed axis-aligned box within one region.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackedBox(u32);

impl PackedBox {
  pub const RANGE_NEAR: u32 = 0;
  pub const RANGE_MID: u32 = 1;
  pub const RANGE_FAR: u32 = 2;
  pub const RANGE_EXTREME: u32 = 3;

  /// Zero-volume sentinel.
  pub const EMPTY: Self = Self(0);

  /// The whole region, useful at any distance.
  pub const FULL: Self = Self::pack(0, 0, 0, 16, 16, 16, Self::RANGE_EXTREME);

  /// Pack a box. Coordinates must be in 0..=16 and `range` in 0..=3.
  #[inline]
  pub const fn pack(x0: u32, y0: u32, z0: u32, x1: u32, y1: u32, z1: u32, range: u32) -> Self {
    debug_assert!(x0 <= 16 && y0 <= 16 && z0 <= 16 && x1 <= 16 && y1 <= 16 && z1 <= 16);
    debug_assert!(range <= Self::RANGE_EXTREME);
    Self(
      (x0 << X0_SHIFT)
        | (y0 << Y0_SHIFT)
        | (z0 << Z0_SHIFT)
        | (x1 << X1_SHIFT)
        | (y1 << Y1_SHIFT)
        | (z1 << Z1_SHIFT)
        | (range << RANGE_SHIFT),
    )
  }

  #[inline]
  pub const fn from_bits(bits: u32) -> Self {
    Self(bits)
  }

  #[inline]
  pub const fn bits(self) -> u32 {
    self.0
  }

  #[inline]
  pub const fn x0(self) -> u32 {
    (self.0 >> X0_SHIFT) & COORD_MASK
  }

  #[inline]
  pub const fn y0(self) -> u32 {
    (self.0 >> Y0_SHIFT) & COORD_MASK
  }

  #[inline]
  pub const fn z0(self) -> u32 {
    (self.0 >> Z0_SHIFT) & COORD_MASK
  }

  #[inline]
  pub const fn x1(self) -> u32 {
    (self.0 >> X1_SHIFT) & COORD_MASK
  }

  #[inline]
  pub const fn y1(self) -> u32 {
    (self.0 >> Y1_SHIFT) & COORD_MASK
  }

  #[inline]
  pub const fn z1(self) -> u32 {
    (self.0 >> Z1_SHIFT) & COORD_MASK
  }

  #[inline]
  pub const fn range(self) -> u32 {
    self.0 >> RANGE_SHIFT
  }

  /// Same box with a different range class.
  #[inline]
  pub const fn with_range(self, range: u32) -> Self {
    debug_assert!(range <= Self::RANGE_EXTREME);
    Self((self.0 & !(0b11 << RANGE_SHIFT)) | (range << RANGE_SHIFT))
  }

  /// Unpack into `(x0, y0, z0, x1, y1, z1, range)`.
  #[inline]
  pub const fn unpack(self) -> (u32, u32, u32, u32, u32, u32, u32) {
    (
      self.x0(),
      self.y0(),
      self.z0(),
      self.x1(),
      self.y1(),
      self.z1(),
      self.range(),
    )
  }

  /// Number of cells covered.
  #[inline]
  pub const fn volume(self) -> u32 {
    (self.x1() - self.x0()) * (self.y1() - self.y0()) * (self.z1() - self.z0())
  }

  /// Area of the largest face.
  #[inline]
  pub fn max_face_area(self) -> u32 {
    let dx = self.x1() - self.x0();
    let dy = self.y1() - self.y0();
    let dz = self.z1() - self.z0();
    (dx * dy).max(dy * dz).max(dx * dz)
  }

  /// True if the box covers the cell at `(x, y, z)`.
  #[inline]
  pub const fn contains_cell(self, x: u32, y: u32, z: u32) -> bool {
    x >= self.x0() && x < self.x1() && y >= self.y0() && y < self.y1() && z >= self.z0() && z < self.z1()
  }

  /// True if the two boxes share at least one cell.
  #[inline]
  pub const fn intersects(self, other: PackedBox) -> bool {
    self.x0() < other.x1()
      && other.x0() < self.x1()
      && self.y0() < other.y1()
      && other.y0() < self.y1()
      && self.z0() < other.z1()
      && other.z0() < self.z1()
  }

  /// Range class of a region at the given squared block distance from the
  /// camera.
  #[inline]
  pub const fn range_from_square_block_dist(square_dist: i32) -> u32 {
    if square_dist <= RANGE_NEAR_BLOCKS * RANGE_NEAR_BLOCKS {
      Self::RANGE_NEAR
    } else if square_dist <= RANGE_MID_BLOCKS * RANGE_MID_BLOCKS {
      Self::RANGE_MID
    } else if square_dist <= RANGE_FAR_BLOCKS * RANGE_FAR_BLOCKS {
      Self::RANGE_FAR
    } else {
      Self::RANGE_EXTREME
    }
  }

  /// Farthest range class at which a box with this largest face still
  /// occludes enough to be worth drawing.
  #[inline]
  pub const fn range_for_face_area(face_area: u32) -> u32 {
    if face_area >= 128 {
      Self::RANGE_EXTREME
    } else if face_area >= 48 {
      Self::RANGE_FAR
    } else if face_area >= 16 {
      Self::RANGE_MID
    } else {
      Self::RANGE_NEAR
    }
  }

  /// Pack a box and derive its range from its largest face.
  #[inline]
  pub fn with_face_range(x0: u32, y0: u32, z0: u32, x1: u32, y1: u32, z1: u32) -> Self {
    let b = Self::pack(x0, y0, z0, x1, y1, z1, 0);
    b.with_range(Self::range_for_face_area(b.max_face_area()))
  }
}

impl std::fmt::Debug for PackedBox {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "PackedBox(({}, {}, {})-({}, {}, {}) r{})",
      self.x0(),
      self.y0(),
      self.z0(),
      self.x1(),
      self.y1(),
      self.z1(),
      self.range()
    )
  }
}

#[cfg(test)]
#[path = "packed_box_test.rs"]
mod packed_box_test;
