//! # Slicer Surfaces
//!
//! Classified layer regions for a 3D printing slicer.
//!
//! After a layer has been sliced and its regions classified (top, bottom,
//! internal, bridge...), downstream stages work on a [`SurfaceCollection`]:
//! - Query surfaces by type or by type family
//! - Flatten them into polygons for infill and perimeter generation
//! - Group surfaces that can share one infill pass
//! - Simplify their geometry without changing their classification
//!
//! ## Example
//!
//! ```rust,ignore
//! use slicer_surfaces::{SurfaceCollection, SurfaceType, surfaces_could_merge};
//!
//! let mut surfaces = SurfaceCollection::new();
//! surfaces.append_with_type(&regions, SurfaceType::Internal);
//! surfaces.simplify(0.05);
//! for group in surfaces.group_by_mergeability(&surfaces_could_merge) {
//!     // one infill pass per group
//! }
//! ```

// Core modules
pub mod clipper;
pub mod config;
pub mod geometry;
pub mod slice;

// Re-export commonly used types
pub use config::SurfaceMergeConfig;
pub use geometry::{Contains, ExPolygon, ExPolygons, Line, Point, Polygon, Polygons, Polyline};
pub use slice::{
    surfaces_could_merge, MergePredicate, Surface, SurfaceCollection, SurfaceType,
    SurfaceTypeFlags, Surfaces,
};

// Re-export path simplification
pub use geometry::simplify::{douglas_peucker, douglas_peucker_ring};

// Re-export clipper operations
pub use clipper::union_ex;

/// Coordinate type used throughout the slicer.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Scale a floating-point coordinate to integer (same as scale, for compatibility).
#[inline]
pub fn scaled(v: CoordF) -> Coord {
    scale(v)
}

/// Unscale an integer coordinate to floating-point (same as unscale, for compatibility).
#[inline]
pub fn unscaled(v: Coord) -> CoordF {
    unscale(v)
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for surface operations.
///
/// Collection operations never fail; errors only come out of the explicit
/// `validate` calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Invalid surface at index {index}: {reason}")]
    InvalidSurface { index: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
