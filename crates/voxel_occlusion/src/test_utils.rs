//! Shared fixtures for unit tests.

use std::cell::Cell;

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::occluder::{BoxFaces, OcclusionRaster};
use crate::packed_box::PackedBox;
use crate::types::OccupancyGrid;

// =============================================================================
// Grids
// =============================================================================

/// Grid where each cell is solid with probability `density`.
pub fn random_grid(rng: &mut StdRng, density: f64) -> OccupancyGrid {
  OccupancyGrid::from_fn(|_, _, _| rng.random_bool(density))
}

/// Assert `boxes` are pairwise disjoint and cover exactly the solid cells.
pub fn assert_exact_cover(grid: &OccupancyGrid, boxes: &[PackedBox]) {
  let mut covered = OccupancyGrid::new();
  for &b in boxes {
    assert!(b.volume() > 0, "empty box {:?}", b);
    for z in b.z0()..b.z1() {
      for y in b.y0()..b.y1() {
        for x in b.x0()..b.x1() {
          let (x, y, z) = (x as usize, y as usize, z as usize);
          assert!(grid.is_solid(x, y, z), "{:?} covers empty cell ({}, {}, {})", b, x, y, z);
          assert!(!covered.is_solid(x, y, z), "{:?} overlaps at ({}, {}, {})", b, x, y, z);
          covered.set(x, y, z);
        }
      }
    }
  }
  assert_eq!(&covered, grid, "solid cells left uncovered");
}

// =============================================================================
// Raster
// =============================================================================

/// Records raster calls and models occlusion orthographically along -Z:
/// a tested box is hidden when one drawn box covers its X/Y extent and lies
/// entirely at or above its maximum Z.
#[derive(Default)]
pub struct RecordingRaster {
  pub drawn: Vec<(Vec3, Vec3, BoxFaces)>,
  pub clears: usize,
  pub view_projections: Vec<Mat4>,
  pub tests: Cell<usize>,
}

impl OcclusionRaster for RecordingRaster {
  fn clear(&mut self) {
    self.drawn.clear();
    self.clears += 1;
  }

  fn set_view_projection(&mut self, view_projection: Mat4) {
    self.view_projections.push(view_projection);
  }

  fn draw_box(&mut self, min: Vec3, max: Vec3, faces: BoxFaces) {
    self.drawn.push((min, max, faces));
  }

  fn test_box(&self, min: Vec3, max: Vec3, _faces: BoxFaces) -> bool {
    self.tests.set(self.tests.get() + 1);
    !self.drawn.iter().any(|(d_min, d_max, _)| {
      d_min.x <= min.x && d_max.x >= max.x && d_min.y <= min.y && d_max.y >= max.y && d_min.z >= max.z
    })
  }
}
