//! Line segments.
//!
//! Only the point-to-segment distance used by Douglas-Peucker lives here.

use super::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A segment from `a` to `b`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Squared distance from `p` to this segment.
    ///
    /// Degenerate segments (`a == b`) measure the distance to `a`.
    pub fn distance_to_point_squared(&self, p: &Point) -> f64 {
        let nearest = p.project_onto_segment(self.a, self.b);
        p.distance_squared(&nearest) as f64
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}
