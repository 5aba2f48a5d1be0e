//! ShadowPotentiallyVisibleRegionSet - regions around the camera in
//! light-aligned traversal order.
//!
//! Slots form a dense cube of `(2r + 1)³` regions centered on the camera's
//! region. A slot's rank is its position in a nested loop over the three
//! axes, ordered by the light vector's largest component first, each walked
//! in the direction the light travels. Scanning ranks upward therefore
//! visits regions nearest the light first, which puts occluders into the
//! shadow raster before the regions they hide.
//!
//! ```text
//! light (0.2, -1.0, 0.5)
//!   primary   Y  step -1   (|y| largest, light travels down: top first)
//!   secondary Z  step +1
//!   tertiary  X  step +1
//!
//! rank = ((o_primary * d) + o_secondary) * d + o_tertiary
//! ```

use glam::{IVec3, Vec3};

/// Axis order and walk direction derived from a light vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraversalOrder {
  /// Axis indices, primary first.
  pub axes: [usize; 3],
  /// +1 walks increasing coordinates, -1 decreasing.
  pub steps: [i32; 3],
}

impl TraversalOrder {
  pub fn from_light_vector(light_vector: Vec3) -> Self {
    let components = light_vector.to_array();
    let mut axes = [0, 1, 2];
    // Stable: ties keep X before Y before Z
    axes.sort_by(|&a, &b| components[b].abs().total_cmp(&components[a].abs()));
    let steps = axes.map(|axis| if components[axis] >= 0.0 { 1 } else { -1 });
    Self { axes, steps }
  }
}

impl Default for TraversalOrder {
  fn default() -> Self {
    Self::from_light_vector(Vec3::NEG_Y)
  }
}

pub struct ShadowPotentiallyVisibleRegionSet<T> {
  radius: i32,
  dim: i32,
  origin: IVec3,
  order: TraversalOrder,
  slots: Vec<Option<(IVec3, T)>>,
  len: usize,
  cursor: usize,
  version: u64,
}

impl<T> ShadowPotentiallyVisibleRegionSet<T> {
  /// Set covering regions within `radius` (Chebyshev) of the origin.
  pub fn new(radius: u32) -> Self {
    let radius = radius as i32;
    let dim = 2 * radius + 1;
    let mut slots = Vec::new();
    slots.resize_with((dim * dim * dim) as usize, || None);
    Self {
      radius,
      dim,
      origin: IVec3::ZERO,
      order: TraversalOrder::default(),
      slots,
      len: 0,
      cursor: 0,
      version: 0,
    }
  }

  #[inline]
  pub fn origin(&self) -> IVec3 {
    self.origin
  }

  #[inline]
  pub fn order(&self) -> TraversalOrder {
    self.order
  }

  /// Bumped on every clear and re-rank; ranks from older versions are stale.
  #[inline]
  pub fn version(&self) -> u64 {
    self.version
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Traversal rank of `region`, or `None` outside the radius.
  pub fn rank(&self, region: IVec3) -> Option<u32> {
    let rel = region - self.origin + IVec3::splat(self.radius);
    if rel.cmplt(IVec3::ZERO).any() || rel.cmpge(IVec3::splat(self.dim)).any() {
      return None;
    }

    let mut rank = 0;
    for (&axis, &step) in self.order.axes.iter().zip(self.order.steps.iter()) {
      let c = rel[axis];
      let ordered = if step > 0 { c } else { self.dim - 1 - c };
      rank = rank * self.dim + ordered;
    }
    Some(rank as u32)
  }

  /// Insert or replace. Returns the rank, or `None` (value dropped) when the
  /// region is outside the radius.
  pub fn add(&mut self, region: IVec3, value: T) -> Option<u32> {
    let rank = self.rank(region)?;
    let slot = &mut self.slots[rank as usize];
    if slot.is_none() {
      self.len += 1;
    }
    *slot = Some((region, value));
    Some(rank)
  }

  pub fn get(&self, region: IVec3) -> Option<&T> {
    let rank = self.rank(region)?;
    self.slots[rank as usize].as_ref().map(|(_, value)| value)
  }

  pub fn remove(&mut self, region: IVec3) -> Option<T> {
    let rank = self.rank(region)?;
    let (_, value) = self.slots[rank as usize].take()?;
    self.len -= 1;
    Some(value)
  }

  /// Drop every entry and bump the version.
  pub fn clear(&mut self) {
    self.slots.iter_mut().for_each(|slot| *slot = None);
    self.len = 0;
    self.cursor = 0;
    self.version += 1;
  }

  /// Re-center on the camera region. Clears when it changed.
  pub fn set_origin(&mut self, origin: IVec3) -> bool {
    if origin == self.origin {
      return false;
    }
    self.origin = origin;
    self.clear();

    #[cfg(feature = "tracing")]
    tracing::debug!(?origin, version = self.version, "shadow region set rebased");

    true
  }

  /// Re-rank stored entries if the light vector changes the traversal
  /// order.
  pub fn set_light_vector(&mut self, light_vector: Vec3) -> bool {
    let order = TraversalOrder::from_light_vector(light_vector);
    if order == self.order {
      return false;
    }
    self.order = order;

    let entries: Vec<(IVec3, T)> = self.slots.iter_mut().filter_map(Option::take).collect();
    self.len = 0;
    self.cursor = 0;
    self.version += 1;
    for (region, value) in entries {
      self.add(region, value);
    }
    true
  }

  /// Restart [`next`](Self::next) from the first rank.
  #[inline]
  pub fn rewind(&mut self) {
    self.cursor = 0;
  }

  /// Next stored entry in traversal order, or `None` when exhausted.
  #[allow(clippy::should_implement_trait)]
  pub fn next(&mut self) -> Option<(IVec3, &T)> {
    let start = self.cursor.min(self.slots.len());
    match self.slots[start..].iter().position(Option::is_some) {
      Some(offset) => {
        let index = start + offset;
        self.cursor = index + 1;
        self.slots[index].as_ref().map(|(region, value)| (*region, value))
      }
      None => {
        self.cursor = self.slots.len();
        None
      }
    }
  }

  /// All entries in traversal order.
  pub fn iter(&self) -> impl Iterator<Item = (IVec3, &T)> + '_ {
    self.slots.iter().filter_map(|slot| slot.as_ref().map(|(region, value)| (*region, value)))
  }
}

#[cfg(test)]
#[path = "region_set_test.rs"]
mod region_set_test;
