//! CullingConfig - externally owned knobs read at `prepare()` time.

use crate::error::ConfigError;

/// Culling configuration.
///
/// Plain data with builder-style setters; the render loop owns it and hands
/// it to the frustum and visibility passes each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CullingConfig {
  /// Angular padding (degrees) always added to the field of view.
  pub static_padding_degrees: f32,

  /// Extra padding (degrees) while the camera is visually unstable
  /// (view bob, screen distortion, hurt/death animation).
  pub dynamic_padding_degrees: f32,

  /// Rasterize regions adjacent to the camera as occluders.
  ///
  /// Also selects the tighter positional dead zone, since near occluders
  /// go stale after much smaller camera moves.
  pub near_occluders: bool,

  /// Gate frustum tests with the coarse macro-visibility store.
  pub region_culling: bool,

  /// Skip occluder tests for shadow casters.
  pub disable_self_shadow_occlusion: bool,

  /// Run the camera occluder at all.
  pub occlusion_enabled: bool,

  /// Lowest block Y of the world (inclusive).
  pub world_min_y: i32,

  /// Highest block Y of the world (exclusive).
  pub world_max_y: i32,
}

impl Default for CullingConfig {
  fn default() -> Self {
    Self {
      static_padding_degrees: 2.0,
      dynamic_padding_degrees: 10.0,
      near_occluders: true,
      region_culling: false,
      disable_self_shadow_occlusion: false,
      occlusion_enabled: true,
      world_min_y: -64,
      world_max_y: 320,
    }
  }
}

impl CullingConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_static_padding(mut self, degrees: f32) -> Self {
    self.static_padding_degrees = degrees;
    self
  }

  pub fn with_dynamic_padding(mut self, degrees: f32) -> Self {
    self.dynamic_padding_degrees = degrees;
    self
  }

  pub fn with_near_occluders(mut self, enabled: bool) -> Self {
    self.near_occluders = enabled;
    self
  }

  pub fn with_region_culling(mut self, enabled: bool) -> Self {
    self.region_culling = enabled;
    self
  }

  pub fn with_self_shadow_occlusion_disabled(mut self, disabled: bool) -> Self {
    self.disable_self_shadow_occlusion = disabled;
    self
  }

  pub fn with_occlusion(mut self, enabled: bool) -> Self {
    self.occlusion_enabled = enabled;
    self
  }

  pub fn with_world_height(mut self, min_y: i32, max_y: i32) -> Self {
    self.world_min_y = min_y;
    self.world_max_y = max_y;
    self
  }

  /// Total padding for the given stability state.
  #[inline]
  pub fn padding_degrees(&self, unstable: bool) -> f32 {
    if unstable {
      self.static_padding_degrees + self.dynamic_padding_degrees
    } else {
      self.static_padding_degrees
    }
  }

  /// Check the configuration for a camera with the given base field of view.
  pub fn validate(&self, fov_degrees: f32) -> Result<(), ConfigError> {
    for (name, value) in [
      ("static_padding_degrees", self.static_padding_degrees),
      ("dynamic_padding_degrees", self.dynamic_padding_degrees),
    ] {
      if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidPadding { name, value });
      }
    }

    let widest = fov_degrees + self.padding_degrees(true);
    if !widest.is_finite() || widest >= 180.0 {
      return Err(ConfigError::FieldOfViewTooWide { fov_degrees: widest });
    }

    if self.world_min_y > self.world_max_y {
      return Err(ConfigError::InvertedWorldBounds {
        min: self.world_min_y,
        max: self.world_max_y,
      });
    }

    Ok(())
  }
}
