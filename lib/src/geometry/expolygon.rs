//! Polygon with holes.
//!
//! This module provides the ExPolygon type (one outer contour plus zero or
//! more holes), mirroring BambuStudio's ExPolygon class. It is the geometry
//! carried by every [`Surface`](crate::slice::Surface).

use super::simplify::douglas_peucker_ring;
use super::{Point, Polygon, Polygons, Polyline};
use crate::{clipper, CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Containment test of a geometry against a region.
///
/// Implemented by [`ExPolygon`] for [`Point`] and [`Polyline`] queries, so
/// generic queries can accept either.
pub trait Contains<T: ?Sized> {
    /// Returns true if `item` lies entirely inside `self`.
    fn contains(&self, item: &T) -> bool;
}

/// A polygon with holes: an outer contour and zero or more inner holes.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExPolygon {
    /// Outer boundary.
    pub contour: Polygon,
    /// Inner boundaries.
    pub holes: Vec<Polygon>,
}

impl ExPolygon {
    /// Create an ExPolygon without holes.
    #[inline]
    pub fn new(contour: Polygon) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    /// Create an ExPolygon with the given holes.
    #[inline]
    pub fn with_holes(contour: Polygon, holes: Vec<Polygon>) -> Self {
        Self { contour, holes }
    }

    /// True if the contour has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    /// True if the contour and every hole have at least three points.
    pub fn is_valid(&self) -> bool {
        self.contour.is_valid() && self.holes.iter().all(Polygon::is_valid)
    }

    /// Check the region for degenerate rings.
    pub fn validate(&self) -> Result<()> {
        if !self.contour.is_valid() {
            return Err(Error::Geometry(format!(
                "contour has {} points, at least 3 required",
                self.contour.len()
            )));
        }
        if let Some((idx, hole)) = self.holes.iter().enumerate().find(|(_, h)| !h.is_valid()) {
            return Err(Error::Geometry(format!(
                "hole {} has {} points, at least 3 required",
                idx,
                hole.len()
            )));
        }
        Ok(())
    }

    /// Number of polygons this region flattens into (contour plus holes).
    #[inline]
    pub fn num_polygons(&self) -> usize {
        1 + self.holes.len()
    }

    /// Contour followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Polygon> {
        std::iter::once(&self.contour).chain(self.holes.iter())
    }

    /// Area of the contour minus the area of the holes (scaled units squared).
    pub fn area(&self) -> CoordF {
        let holes: CoordF = self.holes.iter().map(|h| h.area().abs()).sum();
        self.contour.area().abs() - holes
    }

    /// Flatten into polygons: the contour first, then every hole in order.
    pub fn to_polygons(&self) -> Polygons {
        self.rings().cloned().collect()
    }

    /// Inside the contour and outside every hole.
    ///
    /// Degenerate regions contain nothing.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.contour.contains_point(p) && !self.holes.iter().any(|h| h.contains_point(p))
    }

    /// The whole polyline lies inside the region.
    ///
    /// No part of the path may leave the contour or enter a hole; passing
    /// through a hole vertex to vertex counts as entering it. Empty polylines
    /// are not contained.
    pub fn contains_polyline(&self, polyline: &Polyline) -> bool {
        let Some(first) = polyline.first() else {
            return false;
        };
        if !self.contour.is_valid() {
            return false;
        }
        if polyline.iter().all(|p| p == first) {
            return self.contains_point(first);
        }

        let region = clipper::expolygon_to_geo(self);
        geo::Contains::contains(&region, &clipper::polyline_to_geo(polyline))
    }

    /// Douglas-Peucker each ring with `tolerance` (mm).
    ///
    /// Returns the contour followed by the surviving holes. If the contour
    /// collapses below three points the whole region is gone and the result
    /// is empty; collapsed holes are dropped individually.
    pub fn simplify_p(&self, tolerance: CoordF) -> Polygons {
        let contour = douglas_peucker_ring(self.contour.points(), tolerance);
        if contour.len() < 3 {
            return Vec::new();
        }

        let mut polygons = Vec::with_capacity(self.num_polygons());
        polygons.push(Polygon::from_points(contour));
        for hole in &self.holes {
            let ring = douglas_peucker_ring(hole.points(), tolerance);
            if ring.len() >= 3 {
                polygons.push(Polygon::from_points(ring));
            }
        }
        polygons
    }

    /// Simplify the region with `tolerance` (mm).
    ///
    /// The reduced rings are passed through a union, which resolves any
    /// self-intersections introduced by the reduction. The result may hold
    /// zero regions (the input collapsed), one, or several (the reduction
    /// pinched the region apart).
    pub fn simplify(&self, tolerance: CoordF) -> Vec<ExPolygon> {
        let mut rings = self.simplify_p(tolerance).into_iter();
        let Some(contour) = rings.next() else {
            return Vec::new();
        };
        let reduced = ExPolygon::with_holes(contour, rings.collect());
        clipper::union_ex(std::slice::from_ref(&reduced))
    }
}

impl Contains<Point> for ExPolygon {
    #[inline]
    fn contains(&self, item: &Point) -> bool {
        self.contains_point(item)
    }
}

impl Contains<Polyline> for ExPolygon {
    #[inline]
    fn contains(&self, item: &Polyline) -> bool {
        self.contains_polyline(item)
    }
}

impl From<Polygon> for ExPolygon {
    fn from(contour: Polygon) -> Self {
        Self::new(contour)
    }
}

impl fmt::Debug for ExPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExPolygon(contour={} points, holes={})",
            self.contour.len(),
            self.holes.len()
        )
    }
}

/// Type alias for a collection of ExPolygons.
pub type ExPolygons = Vec<ExPolygon>;
