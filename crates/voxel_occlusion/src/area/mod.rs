//! 2-D rectangle ("area") templates and the maximal-rectangle finder.
//!
//! Every rectangle that fits in a 16×16 slice is enumerated once into a
//! dense, read-only [`AreaCatalog`]. Each [`Area`] carries a 256-bit template
//! of its cells so inclusion and intersection against a slice reduce to four
//! word operations.
//!
//! # Module Structure
//!
//! - [`catalog`]: `AreaCatalog` - interned table, largest areas first
//! - [`finder`]: `AreaFinder` - histogram-stack maximal rectangle search

pub mod catalog;
pub mod finder;

pub use catalog::{catalog, AreaCatalog, AREA_COUNT, SECTION_COUNT};
pub use finder::{largest_area_key, AreaFinder};

use crate::constants::SLICE_WORDS;

/// Derive the catalog key of a rectangle (inclusive corners, each 0..16).
#[inline(always)]
pub const fn area_key(x0: u32, y0: u32, x1: u32, y1: u32) -> u16 {
  (x0 | (y0 << 4) | (x1 << 8) | (y1 << 12)) as u16
}

/// Decode a key back into `(x0, y0, x1, y1)`.
#[inline(always)]
pub const fn key_coords(key: u16) -> (u32, u32, u32, u32) {
  let k = key as u32;
  (k & 0xF, (k >> 4) & 0xF, (k >> 8) & 0xF, (k >> 12) & 0xF)
}

/// True when the key describes a non-inverted rectangle.
#[inline(always)]
pub const fn is_valid_key(key: u16) -> bool {
  let (x0, y0, x1, y1) = key_coords(key);
  x0 <= x1 && y0 <= y1
}

/// Immutable rectangle template within one slice.
#[derive(Clone, Debug)]
pub struct Area {
  /// Position in the catalog (largest areas have the smallest indices).
  pub index: u16,
  pub key: u16,
  pub x0: u8,
  pub y0: u8,
  /// Inclusive.
  pub x1: u8,
  /// Inclusive.
  pub y1: u8,
  /// Number of cells.
  pub size: u16,
  bits: [u64; SLICE_WORDS],
}

impl Area {
  pub(crate) fn new(key: u16, index: u16) -> Self {
    let (x0, y0, x1, y1) = key_coords(key);
    debug_assert!(x0 <= x1 && y0 <= y1);

    let row = ((1u32 << (x1 - x0 + 1)) - 1) << x0;
    let mut bits = [0u64; SLICE_WORDS];
    for y in y0..=y1 {
      bits[(y >> 2) as usize] |= (row as u64) << ((y & 3) << 4);
    }

    Self {
      index,
      key,
      x0: x0 as u8,
      y0: y0 as u8,
      x1: x1 as u8,
      y1: y1 as u8,
      size: ((x1 - x0 + 1) * (y1 - y0 + 1)) as u16,
      bits,
    }
  }

  #[inline]
  pub fn width(&self) -> u32 {
    (self.x1 - self.x0) as u32 + 1
  }

  #[inline]
  pub fn height(&self) -> u32 {
    (self.y1 - self.y0) as u32 + 1
  }

  /// Cell template of this area.
  #[inline]
  pub fn bits(&self) -> &[u64; SLICE_WORDS] {
    &self.bits
  }

  /// True if every cell of this area is set in `bits`.
  #[inline]
  pub fn is_included_by(&self, bits: &[u64; SLICE_WORDS]) -> bool {
    (self.bits[0] & !bits[0])
      | (self.bits[1] & !bits[1])
      | (self.bits[2] & !bits[2])
      | (self.bits[3] & !bits[3])
      == 0
  }

  /// True if any cell of this area is set in `bits`.
  #[inline]
  pub fn intersects(&self, bits: &[u64; SLICE_WORDS]) -> bool {
    (self.bits[0] & bits[0])
      | (self.bits[1] & bits[1])
      | (self.bits[2] & bits[2])
      | (self.bits[3] & bits[3])
      != 0
  }

  /// True if this area can be added to the `filled` mask without covering
  /// any cell twice.
  #[inline]
  pub fn is_additive(&self, filled: &[u64; SLICE_WORDS]) -> bool {
    !self.intersects(filled)
  }

  #[inline]
  pub fn set_bits(&self, bits: &mut [u64; SLICE_WORDS]) {
    for (dst, src) in bits.iter_mut().zip(self.bits.iter()) {
      *dst |= *src;
    }
  }

  #[inline]
  pub fn clear_bits(&self, bits: &mut [u64; SLICE_WORDS]) {
    for (dst, src) in bits.iter_mut().zip(self.bits.iter()) {
      *dst &= !*src;
    }
  }

  /// True if this rectangle is aligned to the 4-cell section grid.
  #[inline]
  pub fn is_section(&self) -> bool {
    self.x0 % 4 == 0 && self.y0 % 4 == 0 && (self.x1 + 1) % 4 == 0 && (self.y1 + 1) % 4 == 0
  }
}
