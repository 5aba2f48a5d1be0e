//! voxel_occlusion - Engine independent occlusion and visibility core for
//! 16³ voxel regions
//!
//! Turns each region's solid-cell bitmask into a handful of boxes and planes
//! that a software rasterizer can draw cheaply, then decides per frame which
//! regions the camera and the shadow cascades need.
//!
//! # Features
//!
//! - **Box decomposition**: exact, disjoint box cover of a region via
//!   maximal-rectangle search over a pre-enumerated area catalog
//! - **Plane extraction**: large 1-cell-thick walls per axis, for regions
//!   too fragmented to box well
//! - **Versioned frustum**: camera frustum with positional and angular dead
//!   zones so unchanged frames reuse cached results
//! - **Shadow casters**: cascade selection and light-ordered traversal with
//!   self-shadow occlusion
//! - **Parallel compression**: rayon worker stages, one compressor per worker
//!
//! # Example
//!
//! ```ignore
//! use voxel_occlusion::{
//!   CullingConfig, NoMacroVisibility, Region, RegionCompressor, RegionCullingFrustum,
//!   TerrainFrustum, TerrainOccluder, TerrainVisibility,
//! };
//!
//! let data = Arc::new(RegionCompressor::new().compress(&grid));
//! let mut regions = vec![Region::new(position, data)];
//!
//! let mut frustum = RegionCullingFrustum::new(TerrainFrustum::new(CullingConfig::default()), NoMacroVisibility);
//! let mut occluder = TerrainOccluder::new(my_raster);
//! let mut visibility = TerrainVisibility::new();
//!
//! // Each frame
//! frustum.terrain_mut().prepare(camera_position, pitch, yaw);
//! for region in visibility.update(&frustum, &mut occluder, &mut regions) {
//!   draw(region);
//! }
//! ```

pub mod constants;
pub mod error;
pub mod packed_box;
pub mod types;

pub use constants::{CASCADE_COUNT, REGION_SHIFT, REGION_SIZE, REGION_SIZE_CB};
pub use error::ConfigError;
pub use packed_box::PackedBox;
pub use types::{Axis, OccupancyGrid};

// Decomposition
pub mod area;
pub mod box_finder;
pub mod plane_finder;
pub mod region;

pub use area::{AreaCatalog, AreaFinder};
pub use box_finder::BoxFinder;
pub use plane_finder::{PlaneFinder, PlaneSet};
pub use region::{Region, RegionCompressor, RegionOcclusionData, RegionVisibilityRecord};

// Visibility
pub mod config;
pub mod frustum;
pub mod occluder;
pub mod shadow;
pub mod visibility;

pub use config::CullingConfig;
pub use frustum::{
  Frustum, MacroVisibilityStore, NoMacroVisibility, ProjectionInputs, RegionCullingFrustum, TerrainFrustum,
};
pub use occluder::{
  BoxFaces, NullRaster, OcclusionRaster, Occluder, ShadowMatrixData, ShadowOccluder, TerrainOccluder,
};
pub use shadow::{ShadowPotentiallyVisibleRegionSet, ShadowRegion, ShadowSetChange, ShadowVisibility};
pub use visibility::{TerrainVisibility, TerrainVisibilityStats};

// Parallel compression
pub mod task_queue;
pub use task_queue::{AsyncCompressionStage, CompressionCompletion, CompressionRequest, CompressionStage};

pub mod metrics;

#[cfg(test)]
mod test_utils;
