//! AreaCatalog - interned table of every rectangle in a 16×16 slice.
//!
//! Built once on first use and shared read-only. Areas are stored densely,
//! largest first (ties broken by ascending key), so callers that want the
//! biggest candidates simply iterate from index 0. Lookup by shape goes
//! through a flat 65 536-entry key table, never a hash map.

use std::sync::LazyLock;

use super::{area_key, is_valid_key, key_coords, Area};

/// Number of distinct rectangles in a 16×16 slice (136²).
pub const AREA_COUNT: usize = 18_496;

/// Number of rectangles aligned to the 4-cell section grid (10²).
pub const SECTION_COUNT: usize = 100;

const KEY_COUNT: usize = 1 << 16;
const NO_AREA: u16 = u16::MAX;

static CATALOG: LazyLock<AreaCatalog> = LazyLock::new(AreaCatalog::build);

/// Shared area catalog.
#[inline]
pub fn catalog() -> &'static AreaCatalog {
  &CATALOG
}

pub struct AreaCatalog {
  areas: Vec<Area>,
  key_to_index: Box<[u16]>,
  sections: Vec<u16>,
  /// Area index -> position among sections, `NO_SECTION` otherwise.
  section_ordinals: Box<[u8]>,
}

const NO_SECTION: u8 = u8::MAX;

impl AreaCatalog {
  fn build() -> Self {
    let mut keys: Vec<u16> = (0..KEY_COUNT as u32)
      .map(|k| k as u16)
      .filter(|&k| is_valid_key(k))
      .collect();

    keys.sort_by_cached_key(|&k| {
      let (x0, y0, x1, y1) = key_coords(k);
      (std::cmp::Reverse((x1 - x0 + 1) * (y1 - y0 + 1)), k)
    });

    let areas: Vec<Area> = keys
      .iter()
      .enumerate()
      .map(|(i, &k)| Area::new(k, i as u16))
      .collect();
    assert_eq!(areas.len(), AREA_COUNT);

    let mut key_to_index = vec![NO_AREA; KEY_COUNT].into_boxed_slice();
    for area in &areas {
      key_to_index[area.key as usize] = area.index;
    }

    let sections: Vec<u16> = areas.iter().filter(|a| a.is_section()).map(|a| a.index).collect();
    assert_eq!(sections.len(), SECTION_COUNT);

    let mut section_ordinals = vec![NO_SECTION; AREA_COUNT].into_boxed_slice();
    for (ordinal, &index) in sections.iter().enumerate() {
      section_ordinals[index as usize] = ordinal as u8;
    }

    Self {
      areas,
      key_to_index,
      sections,
      section_ordinals,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.areas.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.areas.is_empty()
  }

  /// Area at a catalog index. Panics on an out-of-range index.
  #[inline]
  pub fn get(&self, index: u16) -> &Area {
    &self.areas[index as usize]
  }

  /// Catalog index for a key, or `None` for an inverted rectangle.
  #[inline]
  pub fn index_of_key(&self, key: u16) -> Option<u16> {
    match self.key_to_index[key as usize] {
      NO_AREA => None,
      index => Some(index),
    }
  }

  #[inline]
  pub fn by_key(&self, key: u16) -> Option<&Area> {
    self.index_of_key(key).map(|i| self.get(i))
  }

  /// Area with inclusive corners `(x0, y0)`-`(x1, y1)`.
  ///
  /// # Panics
  /// If the corners are inverted or out of range.
  #[inline]
  pub fn by_coords(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> &Area {
    assert!(x0 <= x1 && y0 <= y1 && x1 < 16 && y1 < 16, "invalid area corners");
    self.get(self.key_to_index[area_key(x0, y0, x1, y1) as usize])
  }

  /// All areas, largest first.
  #[inline]
  pub fn iter(&self) -> std::slice::Iter<'_, Area> {
    self.areas.iter()
  }

  /// Section-aligned areas, largest first.
  pub fn sections(&self) -> impl Iterator<Item = &Area> + '_ {
    self.sections.iter().map(move |&i| self.get(i))
  }

  /// Position of an area among [`sections`](Self::sections), if it is one.
  #[inline]
  pub fn section_ordinal(&self, index: u16) -> Option<usize> {
    match self.section_ordinals[index as usize] {
      NO_SECTION => None,
      ordinal => Some(ordinal as usize),
    }
  }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;
