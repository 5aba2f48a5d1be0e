//! Core data types shared by the decomposition and visibility code.

use crate::constants::*;

/// Solid/opaque occupancy of one 16³ region.
///
/// Produced once per region rebuild by upstream meshing and replaced
/// wholesale; the decomposition code only reads it.
#[derive(Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
  slices: [[u64; SLICE_WORDS]; REGION_SIZE],
}

impl OccupancyGrid {
  /// Create an all-empty grid.
  pub const fn new() -> Self {
    Self {
      slices: [[0; SLICE_WORDS]; REGION_SIZE],
    }
  }

  /// Create a fully solid grid.
  pub const fn full() -> Self {
    Self {
      slices: [[u64::MAX; SLICE_WORDS]; REGION_SIZE],
    }
  }

  /// Wrap raw packed words (see [`crate::constants`] for the layout).
  pub fn from_words(words: &[u64; GRID_WORDS]) -> Self {
    let mut grid = Self::new();
    for (i, &word) in words.iter().enumerate() {
      grid.slices[i / SLICE_WORDS][i % SLICE_WORDS] = word;
    }
    grid
  }

  /// Build a grid by evaluating `solid(x, y, z)` for every cell.
  pub fn from_fn(mut solid: impl FnMut(usize, usize, usize) -> bool) -> Self {
    let mut grid = Self::new();
    for z in 0..REGION_SIZE {
      for y in 0..REGION_SIZE {
        for x in 0..REGION_SIZE {
          if solid(x, y, z) {
            grid.set(x, y, z);
          }
        }
      }
    }
    grid
  }

  /// Mark a cell solid.
  #[inline]
  pub fn set(&mut self, x: usize, y: usize, z: usize) {
    let (word, bit) = word_and_bit(x, y, z);
    self.slices[z][word % SLICE_WORDS] |= 1 << bit;
  }

  /// Mark a cell empty.
  #[inline]
  pub fn clear_cell(&mut self, x: usize, y: usize, z: usize) {
    let (word, bit) = word_and_bit(x, y, z);
    self.slices[z][word % SLICE_WORDS] &= !(1 << bit);
  }

  #[inline]
  pub fn is_solid(&self, x: usize, y: usize, z: usize) -> bool {
    let (word, bit) = word_and_bit(x, y, z);
    (self.slices[z][word % SLICE_WORDS] >> bit) & 1 == 1
  }

  /// Number of solid cells.
  pub fn solid_count(&self) -> u32 {
    self.words().iter().map(|w| w.count_ones()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.words().iter().all(|&w| w == 0)
  }

  pub fn is_full(&self) -> bool {
    self.words().iter().all(|&w| w == u64::MAX)
  }

  /// The four words of Z-slice `z`.
  #[inline]
  pub fn slice(&self, z: usize) -> &[u64; SLICE_WORDS] {
    &self.slices[z]
  }

  /// All slices in Z order.
  #[inline]
  pub fn slices(&self) -> &[[u64; SLICE_WORDS]; REGION_SIZE] {
    &self.slices
  }

  /// Packed words in layout order.
  #[inline]
  pub fn words(&self) -> &[u64] {
    self.slices.as_flattened()
  }
}

impl Default for OccupancyGrid {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for OccupancyGrid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OccupancyGrid")
      .field("solid_count", &self.solid_count())
      .finish()
  }
}

/// Axis of a region, used to name plane orientations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
  X = 0,
  Y = 1,
  Z = 2,
}

impl Axis {
  pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
