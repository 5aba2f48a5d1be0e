//! AreaFinder - maximal all-ones rectangle in a 16×16 bit slice.
//!
//! Classic "largest rectangle in a binary matrix": walk rows top to bottom,
//! keep a running per-column height histogram, and run the monotonic-stack
//! largest-rectangle-in-histogram scan on every row.
//!
//! All per-column state lives in packed 4-bit fields so the inner loop never
//! indexes an array:
//!
//! ```text
//! heights   : u64  nibble c = height[c] - 1   (valid where row bit c is set)
//! stack_pos : u64  nibble stack of run start columns, top in low nibble
//! stack_h   : u64  nibble stack of run heights - 1, top in low nibble
//! ```
//!
//! Heights never exceed 16 and the stack never holds more than 16 strictly
//! increasing entries, so every field fits in a nibble.
//!
//! Tie-break: a later rectangle replaces the current best only when strictly
//! larger, so among equal areas the first found in scan order wins.

use super::catalog::catalog;
use super::{area_key, Area};
use crate::constants::{slice_row, REGION_SIZE, SLICE_WORDS};

/// Spread a 16-bit mask so bit `i` lands on bit `4 * i`.
#[inline(always)]
const fn spread_nibbles(bits: u16) -> u64 {
  let mut x = bits as u64;
  x = (x | (x << 24)) & 0x0000_00FF_0000_00FF;
  x = (x | (x << 12)) & 0x000F_000F_000F_000F;
  x = (x | (x << 6)) & 0x0303_0303_0303_0303;
  x = (x | (x << 3)) & 0x1111_1111_1111_1111;
  x
}

/// Key of the largest all-ones rectangle in `bits`, or `None` for an empty
/// slice.
pub fn largest_area_key(bits: &[u64; SLICE_WORDS]) -> Option<u16> {
  let mut heights = 0u64;
  let mut prev_row = 0u16;
  let mut best_size = 0u32;
  let mut best_key = 0u16;

  for y in 0..REGION_SIZE as u32 {
    let row = slice_row(bits, y as usize);
    if row == 0 {
      prev_row = 0;
      heights = 0;
      continue;
    }

    // Continuing columns grow by one, newly set columns restart at height 1
    let carry = spread_nibbles(row & prev_row);
    heights = (heights + carry) & (carry * 0xF);
    prev_row = row;

    // Row fully covered by the current best can't improve on it
    if (row.count_ones() * (y + 1)) <= best_size {
      continue;
    }

    let mut stack_pos = 0u64;
    let mut stack_h = 0u64;
    let mut depth = 0u32;

    for c in 0..=REGION_SIZE as u32 {
      let h = if c < REGION_SIZE as u32 && (row >> c) & 1 == 1 {
        ((heights >> (c << 2)) & 0xF) as u32 + 1
      } else {
        0
      };

      let mut start = c;
      while depth > 0 {
        let top_h = (stack_h & 0xF) as u32 + 1;
        if top_h <= h {
          break;
        }
        let top_start = (stack_pos & 0xF) as u32;
        stack_h >>= 4;
        stack_pos >>= 4;
        depth -= 1;

        let size = top_h * (c - top_start);
        if size > best_size {
          best_size = size;
          best_key = area_key(top_start, y + 1 - top_h, c - 1, y);
        }
        start = top_start;
      }

      if h > 0 && (depth == 0 || ((stack_h & 0xF) as u32 + 1) < h) {
        stack_pos = (stack_pos << 4) | start as u64;
        stack_h = (stack_h << 4) | (h - 1) as u64;
        depth += 1;
      }
    }
  }

  (best_size > 0).then_some(best_key)
}

/// Scratch state for 2-D decomposition of one slice at a time.
///
/// Not shareable across threads; give each worker its own instance.
#[derive(Default)]
pub struct AreaFinder {
  working: [u64; SLICE_WORDS],
}

impl AreaFinder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Largest all-ones rectangle in `bits`.
  pub fn find_largest(&self, bits: &[u64; SLICE_WORDS]) -> Option<&'static Area> {
    largest_area_key(bits).and_then(|key| catalog().by_key(key))
  }

  /// Decompose `bits` into rectangles by repeatedly extracting the largest
  /// one, appending catalog indices to `out`.
  ///
  /// The emitted areas are disjoint and their union is exactly `bits`.
  pub fn find(&mut self, bits: &[u64; SLICE_WORDS], out: &mut Vec<u16>) {
    self.working = *bits;
    while let Some(area) = self.find_largest(&self.working) {
      area.clear_bits(&mut self.working);
      out.push(area.index);
    }
  }

  /// Greedily pick disjoint, fully set section-grid rectangles from `bits`,
  /// largest first, appending catalog indices to `out`.
  ///
  /// Cells outside every chosen section are left for a finer pass.
  pub fn find_sections(&mut self, bits: &[u64; SLICE_WORDS], out: &mut Vec<u16>) {
    self.working = *bits;
    if self.working == [0; SLICE_WORDS] {
      return;
    }
    for section in catalog().sections() {
      if section.is_included_by(&self.working) {
        section.clear_bits(&mut self.working);
        out.push(section.index);
      }
    }
  }
}

#[cfg(test)]
#[path = "finder_test.rs"]
mod finder_test;
