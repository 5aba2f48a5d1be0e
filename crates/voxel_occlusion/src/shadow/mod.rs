//! Shadow caster traversal and selection.
//!
//! - [`region_set`]: dense, light-ordered set of regions around the camera
//! - [`visibility`]: per-frame caster pass over that set

pub mod region_set;
pub mod visibility;

pub use region_set::{ShadowPotentiallyVisibleRegionSet, TraversalOrder};
pub use visibility::{ShadowRegion, ShadowSetChange, ShadowVisibility, ShadowVisibilityStats};
