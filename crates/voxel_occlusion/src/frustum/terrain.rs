//! TerrainFrustum - camera frustum with version-counter invalidation.
//!
//! # Versions
//!
//! ```text
//! prepare(position, pitch, yaw)
//!   │
//!   ├─ camera cell changed, or moved past the dead zone ──► occlusion moved
//!   │                                                        (occlusion_position_version += 1)
//!   ├─ rotated by at least half the padding ─────────────► rotated
//!   ├─ projection differs from last extraction ──────────► projection changed
//!   │
//!   └─ any of the above ──► view_version += 1, planes re-extracted
//! ```
//!
//! Consumers compare the counters against the values they last saw; the
//! counters are the only staleness signal.

use glam::{DVec3, IVec3, Mat4, Vec3};

use super::Frustum;
use crate::config::CullingConfig;
use crate::constants::{OCCLUSION_MOVE_THRESHOLD_FAR, OCCLUSION_MOVE_THRESHOLD_NEAR};

/// Widest field of view handed to the projection.
const MAX_FOV_DEGREES: f32 = 179.0;

/// Per-frame projection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionInputs {
  /// Vertical field of view, degrees.
  pub fov_degrees: f32,
  pub aspect: f32,
  pub near: f32,
  pub far: f32,
  /// View bobbing is active.
  pub view_bob: bool,
  /// Screen shake / nausea distortion strength, 0 when off.
  pub screen_distortion: f32,
  /// Hurt or death camera animation is playing.
  pub hurt_or_dying: bool,
}

impl ProjectionInputs {
  /// Stable camera with the given lens.
  pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
    Self {
      fov_degrees,
      aspect,
      near,
      far,
      view_bob: false,
      screen_distortion: 0.0,
      hurt_or_dying: false,
    }
  }

  /// True when the camera may jitter from frame to frame.
  #[inline]
  pub fn is_unstable(&self) -> bool {
    self.view_bob || self.screen_distortion > 0.0 || self.hurt_or_dying
  }
}

impl Default for ProjectionInputs {
  fn default() -> Self {
    Self::new(70.0, 16.0 / 9.0, 0.05, 1024.0)
  }
}

/// Wrap an angle difference into `[-180, 180)`.
#[inline]
fn wrap_degrees(angle: f32) -> f32 {
  (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Camera-relative view rotation: yaw about +Y, then pitch about +X.
#[inline]
fn view_rotation(pitch: f32, yaw: f32) -> Mat4 {
  Mat4::from_rotation_x(pitch.to_radians()) * Mat4::from_rotation_y(yaw.to_radians())
}

pub struct TerrainFrustum {
  frustum: Frustum,
  config: CullingConfig,

  projection: Mat4,
  last_projection: Mat4,
  padding_degrees: f32,

  camera_cell: IVec3,
  occlusion_position: DVec3,
  pitch: f32,
  yaw: f32,

  view_version: u64,
  occlusion_position_version: u64,
}

impl Default for TerrainFrustum {
  fn default() -> Self {
    Self::new(CullingConfig::default())
  }
}

impl TerrainFrustum {
  pub fn new(config: CullingConfig) -> Self {
    let mut frustum = Self {
      frustum: Frustum::new(),
      config,
      projection: Mat4::IDENTITY,
      last_projection: Mat4::NAN,
      padding_degrees: 0.0,
      camera_cell: IVec3::MIN,
      occlusion_position: DVec3::ZERO,
      pitch: 0.0,
      yaw: 0.0,
      view_version: 0,
      occlusion_position_version: 0,
    };
    frustum.update_projection(&ProjectionInputs::default());
    frustum
  }

  pub fn config(&self) -> &CullingConfig {
    &self.config
  }

  pub fn set_config(&mut self, config: CullingConfig) {
    self.config = config;
  }

  #[inline]
  pub fn view_version(&self) -> u64 {
    self.view_version
  }

  #[inline]
  pub fn occlusion_position_version(&self) -> u64 {
    self.occlusion_position_version
  }

  /// Frustum planes as of the last version bump.
  #[inline]
  pub fn frustum(&self) -> &Frustum {
    &self.frustum
  }

  /// Camera position cached at the last version bump.
  #[inline]
  pub fn position(&self) -> DVec3 {
    self.frustum.position()
  }

  #[inline]
  pub fn camera_cell(&self) -> IVec3 {
    self.camera_cell
  }

  #[inline]
  pub fn padding_degrees(&self) -> f32 {
    self.padding_degrees
  }

  #[inline]
  pub fn projection(&self) -> Mat4 {
    self.projection
  }

  /// Force the next [`prepare`](Self::prepare) to bump both counters.
  ///
  /// Counters stay monotonic across reloads; only the comparison state is
  /// reset to sentinels.
  pub fn reload(&mut self) {
    self.camera_cell = IVec3::MIN;
    self.last_projection = Mat4::NAN;

    #[cfg(feature = "tracing")]
    tracing::debug!(
      view_version = self.view_version,
      occlusion_position_version = self.occlusion_position_version,
      "terrain frustum reloaded"
    );
  }

  /// Rebuild the padded projection. Changes are picked up by the next
  /// [`prepare`](Self::prepare).
  pub fn update_projection(&mut self, inputs: &ProjectionInputs) {
    self.padding_degrees = self.config.padding_degrees(inputs.is_unstable());
    let fov = (inputs.fov_degrees + self.padding_degrees).min(MAX_FOV_DEGREES);
    self.projection = Mat4::perspective_rh_gl(fov.to_radians(), inputs.aspect, inputs.near, inputs.far);
  }

  /// Squared movement allowed within one cell before occlusion is stale.
  #[inline]
  fn move_threshold(&self) -> f64 {
    if self.config.near_occluders {
      OCCLUSION_MOVE_THRESHOLD_NEAR
    } else {
      OCCLUSION_MOVE_THRESHOLD_FAR
    }
  }

  /// Advance to a new camera state. Returns true when the view version was
  /// bumped (and planes re-extracted).
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "terrain_frustum::prepare"))]
  pub fn prepare(&mut self, position: DVec3, pitch: f32, yaw: f32) -> bool {
    let cell = position.floor().as_ivec3();
    let occlusion_moved = cell != self.camera_cell
      || position.distance_squared(self.occlusion_position) > self.move_threshold();

    let d_pitch = pitch - self.pitch;
    let d_yaw = wrap_degrees(yaw - self.yaw);
    let turned = d_pitch * d_pitch + d_yaw * d_yaw;
    let half_padding = self.padding_degrees * 0.5;
    let rotated = turned > 0.0 && turned >= half_padding * half_padding;

    let projection_changed = self.projection != self.last_projection;

    if occlusion_moved {
      self.camera_cell = cell;
      self.occlusion_position = position;
      self.occlusion_position_version += 1;
    }

    if !(occlusion_moved || rotated || projection_changed) {
      return false;
    }

    self.pitch = pitch;
    self.yaw = yaw;
    self.last_projection = self.projection;
    self.view_version += 1;

    let view_projection = self.projection * view_rotation(pitch, yaw);
    self.frustum.set_view_projection(view_projection, position);
    self.frustum.extract_planes();

    #[cfg(feature = "tracing")]
    tracing::trace!(
      view_version = self.view_version,
      occlusion_position_version = self.occlusion_position_version,
      occlusion_moved,
      rotated,
      projection_changed,
      "terrain frustum updated"
    );

    true
  }

  /// Camera-relative view-projection as of the last version bump.
  #[inline]
  pub fn view_projection(&self) -> Mat4 {
    self.frustum.view_projection()
  }

  #[inline]
  pub fn cube_in_frustum(&self, min: Vec3, max: Vec3) -> bool {
    self.frustum.cube_in_frustum(min, max)
  }

  #[inline]
  pub fn is_region_visible(&self, region: IVec3) -> bool {
    self.frustum.is_region_visible(region)
  }
}

#[cfg(test)]
#[path = "terrain_test.rs"]
mod terrain_test;
