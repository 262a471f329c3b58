//! Geometry primitives for surface regions.
//!
//! This module provides the geometric types a surface collection is built on:
//! - [`Point`] - 2D point with integer coordinates (scaled)
//! - [`Line`] - Line segment between two points
//! - [`Polygon`] - Closed polygon (boundary)
//! - [`Polyline`] - Open polyline (path), used in containment queries
//! - [`ExPolygon`] - Polygon with holes (exterior + interior contours)
//! - [`Contains`] - Containment of a point or path inside a region
//!
//! ## Coordinate System
//!
//! Coordinates are scaled integers to avoid floating-point precision issues.
//! They are scaled by `SCALING_FACTOR` (1,000,000), so 1 unit = 1 nanometer.
//!
//! - Use `scale()` / `scaled()` to convert from mm to internal units
//! - Use `unscale()` / `unscaled()` to convert from internal units to mm

mod expolygon;
mod line;
mod point;
mod polygon;
mod polyline;
pub mod simplify;

pub use expolygon::{Contains, ExPolygon, ExPolygons};
pub use line::Line;
pub use point::Point;
pub use polygon::{Polygon, Polygons};
pub use polyline::Polyline;
pub use simplify::{douglas_peucker, douglas_peucker_ring};
