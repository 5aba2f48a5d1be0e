use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::area::key_coords;

/// Brute-force O(16⁴) reference using a 2-D prefix sum.
fn reference_largest(bits: &[u64; SLICE_WORDS]) -> u32 {
  let cell = |x: usize, y: usize| (slice_row(bits, y) >> x) & 1 == 1;

  let mut sum = [[0u32; 17]; 17];
  for y in 0..16 {
    for x in 0..16 {
      sum[y + 1][x + 1] = sum[y][x + 1] + sum[y + 1][x] - sum[y][x] + cell(x, y) as u32;
    }
  }

  let mut best = 0;
  for y0 in 0..16 {
    for y1 in y0..16 {
      for x0 in 0..16 {
        for x1 in x0..16 {
          let size = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u32;
          let filled = sum[y1 + 1][x1 + 1] + sum[y0][x0] - sum[y0][x1 + 1] - sum[y1 + 1][x0];
          if filled == size {
            best = best.max(size);
          }
        }
      }
    }
  }
  best
}

fn slice_from_rows(rows: [u16; 16]) -> [u64; SLICE_WORDS] {
  let mut bits = [0u64; SLICE_WORDS];
  for (y, row) in rows.iter().enumerate() {
    bits[y >> 2] |= (*row as u64) << ((y & 3) << 4);
  }
  bits
}

/// Random slice where each cell is set with probability `density`.
fn random_slice(rng: &mut StdRng, density: f64) -> [u64; SLICE_WORDS] {
  let mut rows = [0u16; 16];
  for row in rows.iter_mut() {
    for x in 0..16 {
      if rng.random_bool(density) {
        *row |= 1 << x;
      }
    }
  }
  slice_from_rows(rows)
}

#[test]
fn test_spread_nibbles() {
  assert_eq!(spread_nibbles(0), 0);
  assert_eq!(spread_nibbles(1), 1);
  assert_eq!(spread_nibbles(0b10), 0x10);
  assert_eq!(spread_nibbles(0x8000), 1 << 60);
  assert_eq!(spread_nibbles(0xFFFF), 0x1111_1111_1111_1111);
}

#[test]
fn test_empty_slice_has_no_area() {
  let finder = AreaFinder::new();
  assert!(finder.find_largest(&[0; SLICE_WORDS]).is_none());
  assert_eq!(largest_area_key(&[0; SLICE_WORDS]), None);
}

#[test]
fn test_full_slice_is_single_area() {
  let mut finder = AreaFinder::new();
  let full = [u64::MAX; SLICE_WORDS];
  let area = finder.find_largest(&full).unwrap();
  assert_eq!(area.size, 256);
  assert_eq!(key_coords(area.key), (0, 0, 15, 15));

  let mut out = Vec::new();
  finder.find(&full, &mut out);
  assert_eq!(out, vec![area.index]);
}

#[test]
fn test_single_row() {
  let bits = [0xFFFF, 0, 0, 0];
  let area = AreaFinder::new().find_largest(&bits).unwrap();
  assert_eq!(key_coords(area.key), (0, 0, 15, 0));
  assert_eq!(area.size, 16);
}

#[test]
fn test_single_cell_in_last_row() {
  let mut rows = [0u16; 16];
  rows[15] = 1 << 15;
  let area = AreaFinder::new().find_largest(&slice_from_rows(rows)).unwrap();
  assert_eq!(key_coords(area.key), (15, 15, 15, 15));
}

#[test]
fn test_full_height_column() {
  // Column x = 7 set on every row: height reaches 16
  let area = AreaFinder::new().find_largest(&slice_from_rows([1 << 7; 16])).unwrap();
  assert_eq!(key_coords(area.key), (7, 0, 7, 15));
}

#[test]
fn test_tie_break_prefers_first_in_scan_order() {
  // Two disjoint 2×2 squares of equal size; the one in lower rows wins
  let mut rows = [0u16; 16];
  rows[1] = 0b11 << 10;
  rows[2] = 0b11 << 10;
  rows[8] = 0b11;
  rows[9] = 0b11;
  let area = AreaFinder::new().find_largest(&slice_from_rows(rows)).unwrap();
  assert_eq!(key_coords(area.key), (10, 1, 11, 2));
}

#[test]
fn test_matches_brute_force_on_random_slices() {
  let mut rng = StdRng::seed_from_u64(0x5EED);
  let finder = AreaFinder::new();
  for i in 0..300 {
    let density = [0.5, 0.8, 0.95][i % 3];
    let bits = random_slice(&mut rng, density);
    let expected = reference_largest(&bits);
    let found = finder.find_largest(&bits).map(|a| a.size as u32).unwrap_or(0);
    assert_eq!(found, expected, "Mismatch on slice {:x?}", bits);

    if let Some(area) = finder.find_largest(&bits) {
      assert!(area.is_included_by(&bits), "Reported area must be all ones");
    }
  }
}

#[test]
fn test_find_partitions_slice_exactly() {
  let mut rng = StdRng::seed_from_u64(42);
  let mut finder = AreaFinder::new();
  for _ in 0..100 {
    let bits = random_slice(&mut rng, 0.7);
    let mut out = Vec::new();
    finder.find(&bits, &mut out);

    let mut union = [0u64; SLICE_WORDS];
    for &index in &out {
      let area = catalog().get(index);
      assert!(!area.intersects(&union), "Areas must be disjoint");
      area.set_bits(&mut union);
    }
    assert_eq!(union, bits);

    // Extraction order is non-increasing in size
    let sizes: Vec<u16> = out.iter().map(|&i| catalog().get(i).size).collect();
    assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
  }
}

#[test]
fn test_find_sections() {
  let mut finder = AreaFinder::new();

  let mut out = Vec::new();
  finder.find_sections(&[u64::MAX; SLICE_WORDS], &mut out);
  assert_eq!(out.len(), 1);
  assert_eq!(catalog().get(out[0]).size, 256);

  // Left half solid plus a ragged column: one 8×16 section, remainder ignored
  let mut rows = [0x00FFu16; 16];
  rows[3] |= 1 << 9;
  out.clear();
  finder.find_sections(&slice_from_rows(rows), &mut out);
  assert_eq!(out.len(), 1);
  assert_eq!(key_coords(catalog().get(out[0]).key), (0, 0, 7, 15));

  // Nothing aligned
  out.clear();
  finder.find_sections(&[0xFFFF, 0, 0, 0], &mut out);
  assert!(out.is_empty());
}
