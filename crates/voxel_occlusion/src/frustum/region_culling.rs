//! RegionCullingFrustum - frustum test ANDed with a coarse visibility lookup.
//!
//! After a box passes the plane test it is quantized to macro cells and up to
//! eight corner probes are sent to an external [`MacroVisibilityStore`]. The
//! box stays visible if any probe does. The gate is skipped (box visible)
//! when disabled, when the box reaches outside the world's vertical bounds,
//! or when it spans more than two macro cells on any axis.

use glam::IVec3;

use super::TerrainFrustum;
use crate::constants::REGION_SHIFT;
use crate::region::region_origin;

/// Macro cells are one region across.
pub const MACRO_CELL_SHIFT: u32 = REGION_SHIFT;

/// External coarse visibility (e.g. a cave/portal graph).
pub trait MacroVisibilityStore {
  /// False only if nothing inside the macro cell can be visible.
  fn is_potentially_visible(&self, cell: IVec3) -> bool;
}

/// Store that never culls.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMacroVisibility;

impl MacroVisibilityStore for NoMacroVisibility {
  #[inline]
  fn is_potentially_visible(&self, _cell: IVec3) -> bool {
    true
  }
}

pub struct RegionCullingFrustum<S> {
  terrain: TerrainFrustum,
  store: S,
}

impl<S: MacroVisibilityStore> RegionCullingFrustum<S> {
  pub fn new(terrain: TerrainFrustum, store: S) -> Self {
    Self { terrain, store }
  }

  #[inline]
  pub fn terrain(&self) -> &TerrainFrustum {
    &self.terrain
  }

  #[inline]
  pub fn terrain_mut(&mut self) -> &mut TerrainFrustum {
    &mut self.terrain
  }

  #[inline]
  pub fn store(&self) -> &S {
    &self.store
  }

  #[inline]
  pub fn store_mut(&mut self) -> &mut S {
    &mut self.store
  }

  /// World-space block box (`max` exclusive).
  pub fn is_box_visible(&self, min: IVec3, max: IVec3) -> bool {
    self.terrain.frustum().is_block_box_visible(min, max) && self.passes_gate(min, max)
  }

  pub fn is_region_visible(&self, region: IVec3) -> bool {
    if !self.terrain.is_region_visible(region) {
      return false;
    }
    let min = region_origin(region);
    self.passes_gate(min, min + IVec3::splat(1 << REGION_SHIFT))
  }

  fn passes_gate(&self, min: IVec3, max: IVec3) -> bool {
    let config = self.terrain.config();
    if !config.region_culling {
      return true;
    }
    if min.y < config.world_min_y || max.y > config.world_max_y {
      return true;
    }

    let lo = min >> MACRO_CELL_SHIFT as i32;
    let hi = (max - IVec3::ONE) >> MACRO_CELL_SHIFT as i32;
    let span = hi - lo;

    if span.cmplt(IVec3::ZERO).any() {
      debug_assert!(false, "empty box {:?}..{:?} reached region culling", min, max);
      return true;
    }
    if span.cmpgt(IVec3::ONE).any() {
      return true;
    }

    for i in 0..8 {
      let pick = |bit: i32, span: i32| (i >> bit) & 1 == 1 && span > 0;
      let (px, py, pz) = (pick(0, span.x), pick(1, span.y), pick(2, span.z));
      // Each distinct probe once
      if ((i & 1 == 1) && !px) || ((i & 2 == 2) && !py) || ((i & 4 == 4) && !pz) {
        continue;
      }
      let probe = IVec3::new(
        if px { hi.x } else { lo.x },
        if py { hi.y } else { lo.y },
        if pz { hi.z } else { lo.z },
      );
      if self.store.is_potentially_visible(probe) {
        return true;
      }
    }
    false
  }
}

#[cfg(test)]
#[path = "region_culling_test.rs"]
mod region_culling_test;
