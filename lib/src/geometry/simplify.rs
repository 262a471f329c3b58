//! Path simplification algorithms.
//!
//! Douglas-Peucker reduction for open paths and closed rings. This is the
//! vertex-reduction half of region simplification; the other half (rebuilding
//! valid regions from the reduced rings) lives in [`ExPolygon::simplify`].
//!
//! ## Reference
//!
//! These algorithms match the behavior of libslic3r:
//! - `MultiPoint::_douglas_peucker()` in MultiPoint.cpp
//! - `ExPolygon::simplify_p()` in ExPolygon.cpp
//!
//! [`ExPolygon::simplify`]: super::ExPolygon::simplify

use super::{Line, Point};
use crate::{scale, CoordF};

/// Douglas-Peucker line simplification algorithm.
///
/// Recursively simplifies a path by removing points that are within `tolerance`
/// of the line segment connecting their neighbors.
///
/// # Arguments
///
/// * `points` - The input points to simplify
/// * `tolerance` - Maximum distance a point can deviate from the simplified path (in mm)
///
/// # Returns
///
/// A new vector of simplified points. The first and last points are always preserved.
pub fn douglas_peucker(points: &[Point], tolerance: CoordF) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let tolerance_scaled = scale(tolerance) as f64;
    let tolerance_sq = tolerance_scaled * tolerance_scaled;

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    // Stack-based implementation (avoids stack overflow for large inputs)
    let mut stack = vec![(0, points.len() - 1)];

    while let Some((anchor_idx, floater_idx)) = stack.pop() {
        if anchor_idx + 1 >= floater_idx {
            continue;
        }

        let chord = Line::new(points[anchor_idx], points[floater_idx]);

        // Find point furthest from the anchor-floater line
        let mut max_dist_sq = 0.0;
        let mut furthest_idx = anchor_idx;

        for (i, point) in points
            .iter()
            .enumerate()
            .take(floater_idx)
            .skip(anchor_idx + 1)
        {
            let dist_sq = chord.distance_to_point_squared(point);
            if dist_sq > max_dist_sq {
                max_dist_sq = dist_sq;
                furthest_idx = i;
            }
        }

        if max_dist_sq > tolerance_sq {
            keep[furthest_idx] = true;
            stack.push((anchor_idx, furthest_idx));
            stack.push((furthest_idx, floater_idx));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

/// Douglas-Peucker simplification of a closed ring.
///
/// The ring is opened at its first point (which is duplicated at the end,
/// simplified, then dropped again), so the closing edge takes part in the
/// reduction. The result may have fewer than three points; callers decide
/// whether such a ring survives.
pub fn douglas_peucker_ring(points: &[Point], tolerance: CoordF) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut closed = Vec::with_capacity(points.len() + 1);
    closed.extend_from_slice(points);
    closed.push(points[0]);

    let mut simplified = douglas_peucker(&closed, tolerance);
    simplified.pop();
    simplified
}
