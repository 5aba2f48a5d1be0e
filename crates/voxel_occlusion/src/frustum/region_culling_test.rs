use std::cell::RefCell;
use std::collections::HashSet;

use glam::DVec3;

use super::*;
use crate::config::CullingConfig;

/// Visible cells plus a log of every probe.
#[derive(Default)]
struct SetStore {
  visible: HashSet<IVec3>,
  probes: RefCell<Vec<IVec3>>,
}

impl MacroVisibilityStore for SetStore {
  fn is_potentially_visible(&self, cell: IVec3) -> bool {
    self.probes.borrow_mut().push(cell);
    self.visible.contains(&cell)
  }
}

fn culling(config: CullingConfig, visible: &[IVec3]) -> RegionCullingFrustum<SetStore> {
  let mut terrain = TerrainFrustum::new(config);
  // Looking down -Z from the middle of region (0, 4, 0)
  terrain.prepare(DVec3::new(8.0, 72.0, 8.0), 0.0, 0.0);
  let store = SetStore {
    visible: visible.iter().copied().collect(),
    ..Default::default()
  };
  RegionCullingFrustum::new(terrain, store)
}

fn enabled() -> CullingConfig {
  CullingConfig::default().with_region_culling(true)
}

#[test]
fn test_disabled_gate_matches_frustum() {
  let frustum = culling(CullingConfig::default(), &[]);
  assert!(frustum.is_region_visible(IVec3::new(0, 4, -3)));
  assert!(frustum.store().probes.borrow().is_empty());
}

#[test]
fn test_gate_rejects_unreachable_region() {
  let frustum = culling(enabled(), &[IVec3::new(0, 4, -2)]);
  assert!(frustum.is_region_visible(IVec3::new(0, 4, -2)));
  assert!(!frustum.is_region_visible(IVec3::new(0, 4, -3)));
}

#[test]
fn test_gate_never_adds_visibility() {
  // Behind the camera: frustum says no, store is never asked
  let frustum = culling(enabled(), &[IVec3::new(0, 4, 3)]);
  assert!(!frustum.is_region_visible(IVec3::new(0, 4, 3)));
  assert!(frustum.store().probes.borrow().is_empty());
}

#[test]
fn test_single_region_box_uses_one_probe() {
  let frustum = culling(enabled(), &[]);
  frustum.is_box_visible(IVec3::new(2, 66, -30), IVec3::new(6, 70, -20));
  assert_eq!(*frustum.store().probes.borrow(), vec![IVec3::new(0, 4, -2)]);
}

#[test]
fn test_box_across_corners_uses_eight_probes() {
  let frustum = culling(enabled(), &[]);
  // Crosses x = 16, y = 80 and z = -32
  assert!(!frustum.is_box_visible(IVec3::new(12, 76, -36), IVec3::new(20, 84, -28)));
  let probes: HashSet<IVec3> = frustum.store().probes.borrow().iter().copied().collect();
  assert_eq!(probes.len(), 8);
  assert_eq!(frustum.store().probes.borrow().len(), 8);
  assert!(probes.contains(&IVec3::new(0, 4, -3)));
  assert!(probes.contains(&IVec3::new(1, 5, -2)));
}

#[test]
fn test_any_probe_suffices() {
  let frustum = culling(enabled(), &[IVec3::new(1, 5, -2)]);
  assert!(frustum.is_box_visible(IVec3::new(12, 76, -36), IVec3::new(20, 84, -28)));
}

#[test]
fn test_large_or_unbounded_boxes_skip_gate() {
  let frustum = culling(enabled().with_world_height(-64, 320), &[]);
  // Spans three macro cells on X
  assert!(frustum.is_box_visible(IVec3::new(-8, 66, -40), IVec3::new(40, 70, -30)));
  // Reaches below the world
  assert!(frustum.is_box_visible(IVec3::new(2, -70, -300), IVec3::new(6, -60, -290)));
  assert!(frustum.store().probes.borrow().is_empty());
}

#[test]
#[cfg_attr(debug_assertions, should_panic)]
fn test_empty_box_fails_open() {
  let frustum = culling(enabled(), &[]);
  // Zero-size box on a macro cell corner
  let at = IVec3::new(16, 80, -16);
  assert!(frustum.is_box_visible(at, at));
}
