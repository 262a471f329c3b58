//! Point type with scaled integer coordinates.
//!
//! Mirrors BambuStudio's `Point`: coordinates are stored as [`Coord`] values
//! scaled by [`SCALING_FACTOR`](crate::SCALING_FACTOR).

use crate::{scale, unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point with scaled integer coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    /// Create a new point from scaled coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a new point from coordinates in mm.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF) -> Self {
        Self {
            x: scale(x),
            y: scale(y),
        }
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &Point) -> i128 {
        let dx = other.x as i128 - self.x as i128;
        let dy = other.y as i128 - self.y as i128;
        dx * dx + dy * dy
    }

    /// 2D cross product (z component) with another vector.
    #[inline]
    pub fn cross(&self, other: &Point) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }

    /// Project this point onto the segment `a`-`b`, clamping to the endpoints.
    pub fn project_onto_segment(&self, a: Point, b: Point) -> Point {
        let abx = b.x as i128 - a.x as i128;
        let aby = b.y as i128 - a.y as i128;
        let len_sq = abx * abx + aby * aby;
        if len_sq == 0 {
            return a;
        }

        let apx = self.x as i128 - a.x as i128;
        let apy = self.y as i128 - a.y as i128;
        let t = (apx * abx + apy * aby) as CoordF / len_sq as CoordF;
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }

        Point::new(
            (a.x as CoordF + t * abx as CoordF).round() as Coord,
            (a.y as CoordF + t * aby as CoordF).round() as Coord,
        )
    }
}

impl From<(Coord, Coord)> for Point {
    #[inline]
    fn from((x, y): (Coord, Coord)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", unscale(self.x), unscale(self.y))
    }
}
