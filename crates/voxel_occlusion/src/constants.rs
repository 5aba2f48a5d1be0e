//! Region layout constants for 16³ occlusion grids.
//!
//! A region is a 16×16×16 cube of unit cells. Its occupancy is stored as
//! 64 packed `u64` words: 16 Z-slices of 4 words, each word holding four
//! 16-bit rows.
//!
//! # Occupancy Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OCCUPANCY WORD LAYOUT                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  word index = z * 4 + (y >> 2)                                          │
//! │  bit index  = (y & 3) * 16 + x                                          │
//! │                                                                         │
//! │  bit:   63        48 47        32 31        16 15         0             │
//! │        ┌────────────┬────────────┬────────────┬────────────┐            │
//! │        │  row y+3   │  row y+2   │  row y+1   │   row y    │            │
//! │        └────────────┴────────────┴────────────┴────────────┘            │
//! │          x: 15 .. 0   (bit 0 of each row is x = 0)                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Within one slice, the 256 cells form a single 256-bit mask addressed as
//! `y * 16 + x`, which is what the 2-D area code operates on.
//!
//! # Coordinate System
//!
//! ```text
//!         +Y
//!          │
//!          │
//!          │
//!          └───────── +X
//!         /
//!        /
//!       +Z
//! ```

/// Cells per region axis.
pub const REGION_SIZE: usize = 16;

/// Cells per region (16³ = 4096).
pub const REGION_SIZE_CB: usize = REGION_SIZE * REGION_SIZE * REGION_SIZE;

/// Half the region edge length, in cells.
pub const HALF_REGION: f32 = 8.0;

/// Bit shift converting block coordinates to region coordinates.
pub const REGION_SHIFT: u32 = 4;

/// Rows packed into one occupancy word.
pub const ROWS_PER_WORD: usize = 4;

/// Words per 16×16 slice.
pub const SLICE_WORDS: usize = REGION_SIZE / ROWS_PER_WORD;

/// Words per region grid.
pub const GRID_WORDS: usize = SLICE_WORDS * REGION_SIZE;

/// Mask for one 16-bit row.
pub const ROW_MASK: u64 = 0xFFFF;

/// Smallest rectangle, in cells, considered a useful occluder surface.
pub const MIN_PLANE_AREA: u32 = 16;

/// Player movement below this squared distance (within the same cell) keeps
/// occlusion results valid when near occluders are present.
pub const OCCLUSION_MOVE_THRESHOLD_NEAR: f64 = 0.0005;

/// Same as [`OCCLUSION_MOVE_THRESHOLD_NEAR`] when no near occluders exist.
pub const OCCLUSION_MOVE_THRESHOLD_FAR: f64 = 1.0;

/// Minimum change in light direction (`1 - cos θ`) that forces the shadow
/// occluder to re-copy cascade state.
pub const LIGHT_VECTOR_THRESHOLD: f32 = 0.0025;

/// Slack added to frustum plane tests.
pub const FRUSTUM_EPSILON: f32 = 0.05;

/// Number of shadow cascades.
pub const CASCADE_COUNT: usize = 4;

/// Upper bound on region distance for [`crate::PackedBox::RANGE_NEAR`].
pub const RANGE_NEAR_BLOCKS: i32 = 48;

/// Upper bound on region distance for [`crate::PackedBox::RANGE_MID`].
pub const RANGE_MID_BLOCKS: i32 = 96;

/// Upper bound on region distance for [`crate::PackedBox::RANGE_FAR`].
pub const RANGE_FAR_BLOCKS: i32 = 192;

/// Word index and bit index of a cell in the packed occupancy layout.
#[inline(always)]
pub const fn word_and_bit(x: usize, y: usize, z: usize) -> (usize, u32) {
  (z * SLICE_WORDS + (y >> 2), (((y & 3) << 4) | x) as u32)
}

/// Extract row `y` (16 bits, bit `x` = column `x`) from a slice.
#[inline(always)]
pub const fn slice_row(slice: &[u64; SLICE_WORDS], y: usize) -> u16 {
  ((slice[y >> 2] >> ((y & 3) << 4)) & ROW_MASK) as u16
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
