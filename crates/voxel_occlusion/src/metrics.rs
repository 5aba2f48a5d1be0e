//! Engine-agnostic culling statistics.
//!
//! Feature-gated and runtime-toggled: without the `metrics` feature every
//! `record_*` call is a no-op.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_occlusion::metrics::{CullingMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // After each visibility pass:
//! metrics.record_terrain(terrain_visibility.stats());
//! metrics.record_shadow(shadow_visibility.stats());
//!
//! // Per drained compression:
//! metrics.record_compression(c.compress_time_us, c.data.boxes.len(), c.data.planes.len());
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::constants::CASCADE_COUNT;
use crate::shadow::ShadowVisibilityStats;
use crate::visibility::TerrainVisibilityStats;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Iterate over values (oldest to newest).
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
  pub fn sum(&self) -> T {
    self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
  }
}

impl RollingWindow<u64> {
  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.sum() as f64 / self.buffer.len() as f64
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = self.buffer.iter().min()?;
    let max = self.buffer.iter().max()?;
    Some((*min, *max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128) // ~2 seconds at 60fps
  }
}

/// Culling statistics, updated once per frame by the render loop.
#[derive(Debug, Clone, Default)]
pub struct CullingMetrics {
  // Camera pass (last frame that did work)
  pub regions_tested: u32,
  pub regions_frustum_culled: u32,
  pub regions_occluded: u32,
  pub regions_visible: u32,
  pub occluders_drawn: u32,

  // Shadow pass
  pub shadow_regions_tested: u32,
  pub shadow_regions_out_of_cascades: u32,
  pub shadow_regions_occluded: u32,
  pub shadow_regions_per_cascade: [u32; CASCADE_COUNT],

  // Compression
  /// Rolling window of compression times in microseconds.
  pub compress_timings: RollingWindow<u64>,
  pub last_compress_us: u64,
  pub boxes_per_region: RollingWindow<u64>,
  pub planes_per_region: RollingWindow<u64>,
  /// Total regions compressed this session.
  pub total_regions_compressed: u64,
}

impl CullingMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Reset everything except the session total.
  pub fn reset(&mut self) {
    let total_regions_compressed = self.total_regions_compressed;
    *self = Self {
      total_regions_compressed,
      ..Self::default()
    };
  }

  pub fn record_terrain(&mut self, stats: &TerrainVisibilityStats) {
    if !is_enabled() {
      return;
    }
    self.regions_tested = stats.tested;
    self.regions_frustum_culled = stats.frustum_culled;
    self.regions_occluded = stats.occluded;
    self.regions_visible = stats.visible;
    self.occluders_drawn = stats.occluders_drawn;
  }

  pub fn record_shadow(&mut self, stats: &ShadowVisibilityStats) {
    if !is_enabled() {
      return;
    }
    self.shadow_regions_tested = stats.tested;
    self.shadow_regions_out_of_cascades = stats.out_of_cascades;
    self.shadow_regions_occluded = stats.occluded;
    self.shadow_regions_per_cascade = stats.per_cascade;
  }

  pub fn record_compression(&mut self, timing_us: u64, boxes: usize, planes: usize) {
    if !is_enabled() {
      return;
    }
    self.compress_timings.push(timing_us);
    self.last_compress_us = timing_us;
    self.boxes_per_region.push(boxes as u64);
    self.planes_per_region.push(planes as u64);
    self.total_regions_compressed += 1;
  }

  pub fn shadow_regions_visible(&self) -> u32 {
    self.shadow_regions_per_cascade.iter().sum()
  }

  pub fn avg_compress_timing_us(&self) -> f64 {
    self.compress_timings.average()
  }

  pub fn avg_boxes_per_region(&self) -> f64 {
    self.boxes_per_region.average()
  }
}
