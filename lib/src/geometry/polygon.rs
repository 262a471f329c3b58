//! Closed polygon type.
//!
//! This module provides the Polygon type representing a closed boundary,
//! mirroring BambuStudio's Polygon class. The closing edge from the last
//! point back to the first is implicit; the first point is never repeated.

use super::Point;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// A closed polygon defined by a sequence of points.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create an axis-aligned rectangle (counter-clockwise) from two corners.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self {
            points: vec![
                Point::new(min.x, min.y),
                Point::new(max.x, min.y),
                Point::new(max.x, max.y),
                Point::new(min.x, max.y),
            ],
        }
    }

    /// Get the points of this polygon.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// A polygon needs at least three vertices to enclose any area.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }

    /// Signed area (shoelace formula) in scaled units squared.
    ///
    /// Positive for counter-clockwise polygons, negative for clockwise ones.
    pub fn signed_area(&self) -> CoordF {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum: i128 = 0;
        for i in 0..n {
            let j = (i + 1) % n;
            sum += self.points[i].cross(&self.points[j]);
        }
        sum as CoordF * 0.5
    }

    /// Signed area in scaled units squared (same as [`Polygon::signed_area`]).
    #[inline]
    pub fn area(&self) -> CoordF {
        self.signed_area()
    }

    /// Reverse the winding order in place.
    #[inline]
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Make the polygon counter-clockwise. Returns true if it was reversed.
    pub fn make_counter_clockwise(&mut self) -> bool {
        if self.signed_area() < 0.0 {
            self.reverse();
            true
        } else {
            false
        }
    }

    /// Make the polygon clockwise. Returns true if it was reversed.
    pub fn make_clockwise(&mut self) -> bool {
        if self.signed_area() > 0.0 {
            self.reverse();
            true
        } else {
            false
        }
    }

    /// Point-in-polygon test (ray casting, even-odd rule).
    ///
    /// Points exactly on the boundary may be reported either way.
    /// Degenerate polygons (fewer than three points) contain nothing.
    pub fn contains_point(&self, p: &Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > p.y) != (pj.y > p.y) {
                // x coordinate of the edge at height p.y, compared without division
                let lhs = (p.x as i128 - pi.x as i128) * (pj.y as i128 - pi.y as i128);
                let rhs = (pj.x as i128 - pi.x as i128) * (p.y as i128 - pi.y as i128);
                if (pj.y > pi.y && lhs < rhs) || (pj.y < pi.y && lhs > rhs) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({} points)", self.points.len())
    }
}

impl Deref for Polygon {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polygon {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

/// Type alias for a collection of polygons.
pub type Polygons = Vec<Polygon>;
