//! Clipper polygon boolean operations module.
//!
//! This module provides the polygon union used to rebuild valid regions
//! after vertex reduction, through the geo-clipper library, and the
//! conversions into `geo` types shared with the containment queries.
//!
//! Coordinates are passed to Clipper as the scaled integers they already are
//! (factor 1.0), so a round trip through Clipper does not lose precision.

use crate::geometry::{ExPolygon, ExPolygons, Point, Polygon, Polyline};
use crate::Coord;
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::Clipper;

/// Scale applied by Clipper when converting to its integer space.
const CLIPPER_FACTOR: f64 = 1.0;

/// Convert a ring of our points into a closed geo LineString.
fn ring_to_geo(polygon: &Polygon) -> LineString<f64> {
    let mut ring: Vec<GeoCoord<f64>> = polygon
        .points()
        .iter()
        .map(|p| GeoCoord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();

    // Close the ring if needed
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(*first);
        }
    }

    LineString::new(ring)
}

/// Convert our ExPolygon to geo's Polygon type (with holes).
///
/// The contour is emitted counter-clockwise and holes clockwise whatever the
/// input winding, so holes stay empty under Clipper's non-zero fill rule.
pub(crate) fn expolygon_to_geo(expoly: &ExPolygon) -> GeoPolygon<f64> {
    let mut contour = expoly.contour.clone();
    contour.make_counter_clockwise();

    let holes = expoly
        .holes
        .iter()
        .filter(|hole| hole.is_valid())
        .map(|hole| {
            let mut hole = hole.clone();
            hole.make_clockwise();
            ring_to_geo(&hole)
        })
        .collect();

    GeoPolygon::new(ring_to_geo(&contour), holes)
}

/// Convert an open path into a geo LineString.
pub(crate) fn polyline_to_geo(polyline: &Polyline) -> LineString<f64> {
    polyline
        .iter()
        .map(|p| GeoCoord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect()
}

/// Convert a geo ring back to our Polygon, dropping the closing point.
fn geo_to_ring(ring: &LineString<f64>) -> Polygon {
    let mut points: Vec<Point> = ring
        .coords()
        .map(|c| Point::new(c.x.round() as Coord, c.y.round() as Coord))
        .collect();

    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    Polygon::from_points(points)
}

/// Convert geo's Polygon to our ExPolygon type (with holes).
fn geo_to_expolygon(geo_poly: &GeoPolygon<f64>) -> ExPolygon {
    ExPolygon::with_holes(
        geo_to_ring(geo_poly.exterior()),
        geo_poly.interiors().iter().map(geo_to_ring).collect(),
    )
}

/// Convert geo's MultiPolygon to our ExPolygons type.
fn geo_multi_to_expolygons(multi: &MultiPolygon<f64>) -> ExPolygons {
    multi
        .0
        .iter()
        .map(geo_to_expolygon)
        .filter(ExPolygon::is_valid)
        .collect()
}

/// Convert our ExPolygons to geo's MultiPolygon, skipping degenerate regions.
fn expolygons_to_geo_multi(expolys: &[ExPolygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        expolys
            .iter()
            .filter(|e| e.contour.is_valid())
            .map(expolygon_to_geo)
            .collect(),
    )
}

// ============================================================================
// Boolean Operations
// ============================================================================

/// Compute the union of a set of potentially overlapping or
/// self-intersecting polygons.
///
/// The result always comes back from Clipper: overlaps are merged,
/// self-intersections resolved and degenerate rings removed. A pinched
/// region comes back as several regions; a region with no area comes back
/// as none.
pub fn union_ex(expolygons: &[ExPolygon]) -> ExPolygons {
    let subject = expolygons_to_geo_multi(expolygons);
    if subject.0.is_empty() {
        return Vec::new();
    }

    let result = subject.union(&MultiPolygon::<f64>::new(Vec::new()), CLIPPER_FACTOR);
    geo_multi_to_expolygons(&result)
}
