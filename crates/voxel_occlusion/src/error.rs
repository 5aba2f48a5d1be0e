//! Errors for externally supplied configuration.
//!
//! Everything else in this crate is total over fixed-size input; internal
//! invariant violations panic.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("{name} must be finite and non-negative, got {value}")]
  InvalidPadding { name: &'static str, value: f32 },

  #[error("padded field of view {fov_degrees}° must stay below 180°")]
  FieldOfViewTooWide { fov_degrees: f32 },

  #[error("world Y bounds inverted: min {min} > max {max}")]
  InvertedWorldBounds { min: i32, max: i32 },

  #[error("cascade {index} radius {radius} must be finite and positive")]
  InvalidCascadeRadius { index: usize, radius: f32 },

  #[error("cascade {index} radius {radius} exceeds next cascade radius {next}")]
  CascadesNotNested { index: usize, radius: f32, next: f32 },

  #[error("light vector must have non-zero finite length")]
  ZeroLightVector,
}
