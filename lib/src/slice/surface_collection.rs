//! Surface collection.
//!
//! A [`SurfaceCollection`] is the ordered set of classified surfaces of one
//! layer region. Upstream stages fill it; infill and perimeter generation
//! query, partition and reshape it.
//!
//! # Borrowed views
//!
//! [`filter_by_types`](SurfaceCollection::filter_by_types),
//! [`group_by_properties`](SurfaceCollection::group_by_properties) and
//! [`group_by_mergeability`](SurfaceCollection::group_by_mergeability) return
//! references into the collection rather than copies. A view is invalidated
//! by any structural mutation (append, remove/keep, simplify); the borrow
//! checker rejects code that mutates the collection while a view is alive.
//!
//! [`simplify`](SurfaceCollection::simplify) may split a surface into
//! several, or drop a surface whose geometry collapses to nothing.
//!
//! The collection is not synchronized. Share it across threads only behind
//! the caller's own lock, or clone it first.
//!
//! # BambuStudio Reference
//!
//! This module corresponds to:
//! - `src/libslic3r/SurfaceCollection.hpp/cpp`

use super::surface::{Surface, SurfaceType, SurfaceTypeFlags, Surfaces};
use crate::geometry::{Contains, ExPolygon, ExPolygons, Polygons};
use crate::{CoordF, Error, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Decides whether two surfaces may be processed as one unit.
///
/// Implemented by [`SurfaceMergeConfig`](crate::config::SurfaceMergeConfig)
/// and by any `Fn(&Surface, &Surface) -> bool`, including
/// [`surfaces_could_merge`](super::surfaces_could_merge).
pub trait MergePredicate {
    /// True if `b` may join the group whose first member is `a`.
    fn could_merge(&self, a: &Surface, b: &Surface) -> bool;
}

impl<F> MergePredicate for F
where
    F: Fn(&Surface, &Surface) -> bool,
{
    #[inline]
    fn could_merge(&self, a: &Surface, b: &Surface) -> bool {
        self(a, b)
    }
}

/// Bit set over [`SurfaceType`] tags, for O(1) membership tests.
fn type_set(types: &[SurfaceType]) -> u32 {
    types.iter().fold(0, |set, t| set | (1 << t.index()))
}

#[inline]
fn in_type_set(set: u32, surface_type: SurfaceType) -> bool {
    set & (1 << surface_type.index()) != 0
}

/// Collection of surfaces with utility methods.
///
/// Insertion order is preserved but carries no meaning to consumers.
/// Surfaces are allowed to overlap.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCollection {
    /// The surfaces in this collection.
    pub surfaces: Vec<Surface>,
}

impl SurfaceCollection {
    /// Create a new empty surface collection.
    pub fn new() -> Self {
        Self {
            surfaces: Vec::new(),
        }
    }

    /// Create an empty collection with room for `capacity` surfaces.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            surfaces: Vec::with_capacity(capacity),
        }
    }

    /// Create a surface collection from a vector of surfaces.
    pub fn from_surfaces(surfaces: Vec<Surface>) -> Self {
        Self { surfaces }
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Get the number of surfaces.
    #[inline]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Surface> {
        self.surfaces.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Surface> {
        self.surfaces.iter_mut()
    }

    /// Clear all surfaces.
    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    // ------------------------------------------------------------------
    // Bulk mutation
    // ------------------------------------------------------------------

    /// Add a surface to the collection.
    pub fn push(&mut self, surface: Surface) {
        self.surfaces.push(surface);
    }

    /// Append copies of every surface of `other`, after the existing ones.
    pub fn append(&mut self, other: &SurfaceCollection) {
        self.extend_from_slice(&other.surfaces);
    }

    /// Append copies of `surfaces`, after the existing ones.
    pub fn extend_from_slice(&mut self, surfaces: &[Surface]) {
        self.surfaces.reserve(surfaces.len());
        self.surfaces.extend_from_slice(surfaces);
    }

    /// Append one surface per region, each a copy of `template` carrying
    /// that region's geometry.
    pub fn append_with_template(&mut self, expolygons: &[ExPolygon], template: &Surface) {
        self.surfaces.reserve(expolygons.len());
        self.surfaces.extend(
            expolygons
                .iter()
                .map(|expoly| Surface::with_expolygon(template, expoly.clone())),
        );
    }

    /// Append one fresh surface of `surface_type` per region.
    pub fn append_with_type(&mut self, expolygons: &[ExPolygon], surface_type: SurfaceType) {
        self.surfaces.reserve(expolygons.len());
        self.surfaces.extend(
            expolygons
                .iter()
                .map(|expoly| Surface::new(expoly.clone(), surface_type)),
        );
    }

    /// Replace the contents with copies of `other`'s surfaces.
    pub fn set(&mut self, other: &SurfaceCollection) {
        self.surfaces.clear();
        self.append(other);
    }

    /// Replace the contents with one fresh surface of `surface_type` per region.
    pub fn set_with_type(&mut self, expolygons: &[ExPolygon], surface_type: SurfaceType) {
        self.surfaces.clear();
        self.append_with_type(expolygons, surface_type);
    }

    /// Retype every surface.
    pub fn set_type(&mut self, surface_type: SurfaceType) {
        for surface in &mut self.surfaces {
            surface.surface_type = surface_type;
        }
    }

    /// Simplify every surface's geometry with `tolerance` (mm).
    ///
    /// A surface may come back as several pieces, each keeping the original
    /// classification. A surface whose geometry collapses to nothing is
    /// dropped from the collection and logged at `debug` level.
    /// See [`simplify_with`](Self::simplify_with).
    pub fn simplify(&mut self, tolerance: CoordF) {
        self.simplify_with(|expoly| expoly.simplify(tolerance));
    }

    /// Replace every surface by the pieces `kernel` returns for its geometry.
    ///
    /// Each piece becomes its own surface carrying a copy of the original's
    /// classification and parameters. Pieces of one surface stay in the
    /// kernel's order and take the place of that surface. A surface whose
    /// geometry simplifies to nothing is removed.
    pub fn simplify_with<F>(&mut self, mut kernel: F)
    where
        F: FnMut(&ExPolygon) -> ExPolygons,
    {
        let input = std::mem::take(&mut self.surfaces);
        let input_len = input.len();
        let mut collapsed = 0usize;
        self.surfaces.reserve(input_len);

        for surface in input {
            let pieces = kernel(&surface.expolygon);
            if pieces.is_empty() {
                collapsed += 1;
                debug!("simplify: {} collapsed to nothing", surface);
                continue;
            }
            self.surfaces.extend(
                pieces
                    .into_iter()
                    .map(|expoly| Surface::with_expolygon(&surface, expoly)),
            );
        }

        debug!(
            "simplify: {} surfaces -> {} ({} collapsed)",
            input_len,
            self.surfaces.len(),
            collapsed
        );
    }

    /// Remove every surface of `surface_type`, keeping the order of the rest.
    pub fn remove_type(&mut self, surface_type: SurfaceType) {
        self.remove_types(&[surface_type]);
    }

    /// Remove every surface whose type is one of `types`, keeping the order
    /// of the rest.
    pub fn remove_types(&mut self, types: &[SurfaceType]) {
        let set = type_set(types);
        let before = self.surfaces.len();
        self.surfaces.retain(|s| !in_type_set(set, s.surface_type));
        debug!(
            "remove_types {:?}: removed {} of {} surfaces",
            types,
            before - self.surfaces.len(),
            before
        );
    }

    /// Keep only the surfaces of `surface_type`, in their original order.
    pub fn keep_type(&mut self, surface_type: SurfaceType) {
        self.keep_types(&[surface_type]);
    }

    /// Keep only the surfaces whose type is one of `types`, in their
    /// original order.
    ///
    /// Runs in one pass over the collection whatever the size of `types`.
    pub fn keep_types(&mut self, types: &[SurfaceType]) {
        let set = type_set(types);
        let before = self.surfaces.len();
        self.surfaces.retain(|s| in_type_set(set, s.surface_type));
        debug!(
            "keep_types {:?}: removed {} of {} surfaces",
            types,
            before - self.surfaces.len(),
            before
        );
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of polygons [`to_polygons`](Self::to_polygons) produces:
    /// one contour plus the holes of every surface.
    pub fn polygons_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.expolygon.num_polygons()).sum()
    }

    /// Flatten every surface into polygons (contour, then holes), in order.
    pub fn to_polygons(&self) -> Polygons {
        let mut polygons = Vec::with_capacity(self.polygons_count());
        for surface in &self.surfaces {
            polygons.extend(surface.expolygon.rings().cloned());
        }
        polygons
    }

    /// One region per surface, in order.
    pub fn to_expolygons(&self) -> ExPolygons {
        self.surfaces.iter().map(|s| s.expolygon.clone()).collect()
    }

    /// True if some internal surface contains `item`.
    pub fn any_internal_contains<T>(&self, item: &T) -> bool
    where
        T: ?Sized,
        ExPolygon: Contains<T>,
    {
        self.surfaces
            .iter()
            .any(|s| s.is_internal() && s.expolygon.contains(item))
    }

    /// True if some bottom surface contains `item`.
    pub fn any_bottom_contains<T>(&self, item: &T) -> bool
    where
        T: ?Sized,
        ExPolygon: Contains<T>,
    {
        self.surfaces
            .iter()
            .any(|s| s.is_bottom() && s.expolygon.contains(item))
    }

    /// Check if any surface has the given type.
    pub fn has_type(&self, surface_type: SurfaceType) -> bool {
        self.surfaces.iter().any(|s| s.surface_type == surface_type)
    }

    /// Get all surfaces of a specific type.
    pub fn filter_by_type(&self, surface_type: SurfaceType) -> Vec<&Surface> {
        self.surfaces
            .iter()
            .filter(|s| s.surface_type == surface_type)
            .collect()
    }

    /// Get all surfaces whose type is one of `types`, in collection order.
    ///
    /// Each surface appears at most once however often its type is listed.
    pub fn filter_by_types(&self, types: &[SurfaceType]) -> Vec<&Surface> {
        let set = type_set(types);
        self.surfaces
            .iter()
            .filter(|s| in_type_set(set, s.surface_type))
            .collect()
    }

    /// Mutable form of [`filter_by_types`](Self::filter_by_types).
    pub fn filter_by_types_mut(&mut self, types: &[SurfaceType]) -> Vec<&mut Surface> {
        let set = type_set(types);
        self.surfaces
            .iter_mut()
            .filter(|s| in_type_set(set, s.surface_type))
            .collect()
    }

    /// Append the polygons of every surface of `surface_type` to `out`.
    pub fn filter_by_type_polygons(&self, surface_type: SurfaceType, out: &mut Polygons) {
        for surface in self.surfaces.iter().filter(|s| s.surface_type == surface_type) {
            out.extend(surface.expolygon.rings().cloned());
        }
    }

    /// Append the polygons of every surface sharing a bit with `mask` to `out`.
    ///
    /// `mask` may be a single [`SurfaceType`], a combination such as
    /// `SurfaceType::Top | SurfaceType::Bottom`, or raw [`SurfaceTypeFlags`]
    /// such as `SurfaceTypeFlags::BRIDGE`.
    pub fn filter_by_incl_type(&self, mask: impl Into<SurfaceTypeFlags>, out: &mut Polygons) {
        let mask = mask.into();
        for surface in self.surfaces.iter().filter(|s| s.surface_type.intersects(mask)) {
            out.extend(surface.expolygon.rings().cloned());
        }
    }

    /// Get all top surfaces.
    pub fn top_surfaces(&self) -> Vec<&Surface> {
        self.surfaces.iter().filter(|s| s.is_top()).collect()
    }

    /// Get all bottom surfaces.
    pub fn bottom_surfaces(&self) -> Vec<&Surface> {
        self.surfaces.iter().filter(|s| s.is_bottom()).collect()
    }

    /// Get all solid surfaces.
    pub fn solid_surfaces(&self) -> Vec<&Surface> {
        self.surfaces.iter().filter(|s| s.is_solid()).collect()
    }

    /// Get all bridge surfaces.
    pub fn bridge_surfaces(&self) -> Vec<&Surface> {
        self.surfaces.iter().filter(|s| s.is_bridge()).collect()
    }

    /// Get the total area of all surfaces.
    pub fn total_area(&self) -> CoordF {
        self.surfaces.iter().map(|s| s.area()).sum()
    }

    /// Check every surface; the first failure is reported with its index.
    pub fn validate(&self) -> Result<()> {
        for (index, surface) in self.surfaces.iter().enumerate() {
            surface
                .validate()
                .map_err(|err| Error::InvalidSurface {
                    index,
                    reason: match err {
                        Error::Geometry(reason) => reason,
                        other => other.to_string(),
                    },
                })?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    /// Partition the surfaces by (type, thickness, thickness_layers,
    /// bridge_angle).
    ///
    /// Groups appear in order of their first member; members keep
    /// collection order.
    pub fn group_by_properties(&self) -> Vec<Vec<&Surface>> {
        let mut groups: Vec<Vec<&Surface>> = Vec::new();
        for surface in &self.surfaces {
            let found = groups
                .iter()
                .position(|group| group[0].same_properties(surface));
            match found {
                Some(idx) => groups[idx].push(surface),
                None => groups.push(vec![surface]),
            }
        }
        trace!(
            "group_by_properties: {} surfaces in {} groups",
            self.surfaces.len(),
            groups.len()
        );
        groups
    }

    /// Partition the surfaces with an external mergeability predicate.
    ///
    /// Each surface is tested against the first member of every existing
    /// group, in group order, and joins the first group that accepts it.
    /// Only the first member is consulted, so with a non-transitive
    /// predicate two members of one group may not merge with each other.
    pub fn group_by_mergeability<P>(&mut self, predicate: &P) -> Vec<Vec<&mut Surface>>
    where
        P: MergePredicate + ?Sized,
    {
        let total = self.surfaces.len();
        let mut groups: Vec<Vec<&mut Surface>> = Vec::new();
        for surface in self.surfaces.iter_mut() {
            let found = groups
                .iter()
                .position(|group| predicate.could_merge(&*group[0], &*surface));
            match found {
                Some(idx) => groups[idx].push(surface),
                None => groups.push(vec![surface]),
            }
        }
        trace!(
            "group_by_mergeability: {} surfaces in {} groups",
            total,
            groups.len()
        );
        groups
    }
}

impl Index<usize> for SurfaceCollection {
    type Output = Surface;

    fn index(&self, index: usize) -> &Surface {
        &self.surfaces[index]
    }
}

impl IndexMut<usize> for SurfaceCollection {
    fn index_mut(&mut self, index: usize) -> &mut Surface {
        &mut self.surfaces[index]
    }
}

impl IntoIterator for SurfaceCollection {
    type Item = Surface;
    type IntoIter = std::vec::IntoIter<Surface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.into_iter()
    }
}

impl<'a> IntoIterator for &'a SurfaceCollection {
    type Item = &'a Surface;
    type IntoIter = std::slice::Iter<'a, Surface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.iter()
    }
}

impl<'a> IntoIterator for &'a mut SurfaceCollection {
    type Item = &'a mut Surface;
    type IntoIter = std::slice::IterMut<'a, Surface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.iter_mut()
    }
}

impl Extend<Surface> for SurfaceCollection {
    fn extend<I: IntoIterator<Item = Surface>>(&mut self, iter: I) {
        self.surfaces.extend(iter);
    }
}

impl FromIterator<Surface> for SurfaceCollection {
    fn from_iter<I: IntoIterator<Item = Surface>>(iter: I) -> Self {
        Self {
            surfaces: iter.into_iter().collect(),
        }
    }
}

impl From<Surfaces> for SurfaceCollection {
    fn from(surfaces: Surfaces) -> Self {
        Self::from_surfaces(surfaces)
    }
}

impl fmt::Debug for SurfaceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.surfaces.iter()).finish()
    }
}

impl fmt::Display for SurfaceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceCollection({} surfaces)", self.surfaces.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurfaceMergeConfig;
    use crate::geometry::{Point, Polygon, Polyline};
    use crate::slice::surfaces_could_merge;
    use test_log::test;

    fn square_mm(x: f64, y: f64, size: f64) -> ExPolygon {
        Polygon::rectangle(Point::new_scale(x, y), Point::new_scale(x + size, y + size)).into()
    }

    fn frame_mm(x: f64, y: f64) -> ExPolygon {
        // 10mm square with a 4mm hole
        let mut hole = Polygon::rectangle(
            Point::new_scale(x + 3.0, y + 3.0),
            Point::new_scale(x + 7.0, y + 7.0),
        );
        hole.make_clockwise();
        ExPolygon::with_holes(
            Polygon::rectangle(Point::new_scale(x, y), Point::new_scale(x + 10.0, y + 10.0)),
            vec![hole],
        )
    }

    fn surface(surface_type: SurfaceType, thickness: Option<CoordF>) -> Surface {
        let mut surface = Surface::new(square_mm(0.0, 0.0, 10.0), surface_type);
        surface.thickness = thickness;
        surface
    }

    /// One surface of every type, each on its own 10mm square along X.
    fn every_type() -> SurfaceCollection {
        SurfaceType::ALL
            .iter()
            .enumerate()
            .map(|(i, &t)| Surface::new(square_mm(i as f64 * 20.0, 0.0, 10.0), t))
            .collect()
    }

    fn types_of(collection: &SurfaceCollection) -> Vec<SurfaceType> {
        collection.iter().map(|s| s.surface_type).collect()
    }

    #[test]
    fn test_surface_collection() {
        let mut collection = SurfaceCollection::new();
        assert!(collection.is_empty());

        collection.push(Surface::top(square_mm(0.0, 0.0, 10.0)));
        collection.push(Surface::bottom(square_mm(0.0, 0.0, 10.0)));
        collection.push(Surface::internal(square_mm(0.0, 0.0, 10.0)));

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.top_surfaces().len(), 1);
        assert_eq!(collection.bottom_surfaces().len(), 1);
        assert_eq!(collection.solid_surfaces().len(), 2);
        assert!(collection.bridge_surfaces().is_empty());
        assert!(collection.has_type(SurfaceType::Internal));
        assert!(!collection.has_type(SurfaceType::InternalVoid));

        let area_mm2 = collection.total_area() / (crate::SCALING_FACTOR * crate::SCALING_FACTOR);
        assert!((area_mm2 - 300.0).abs() < 1e-6);

        collection.clear();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut a = SurfaceCollection::from_surfaces(vec![
            surface(SurfaceType::Top, None),
            surface(SurfaceType::Bottom, None),
        ]);
        let b = SurfaceCollection::from_surfaces(vec![
            surface(SurfaceType::Internal, None),
            surface(SurfaceType::InternalVoid, None),
        ]);

        a.append(&b);
        assert_eq!(
            types_of(&a),
            vec![
                SurfaceType::Top,
                SurfaceType::Bottom,
                SurfaceType::Internal,
                SurfaceType::InternalVoid
            ]
        );

        a.extend_from_slice(&b.surfaces[..1]);
        assert_eq!(a.len(), 5);
        assert_eq!(a[4].surface_type, SurfaceType::Internal);
    }

    #[test]
    fn test_append_with_type_round_trip() {
        let regions = vec![square_mm(0.0, 0.0, 10.0), frame_mm(20.0, 0.0), square_mm(40.0, 0.0, 5.0)];
        let mut collection = SurfaceCollection::new();
        collection.append_with_type(&regions, SurfaceType::InternalSolid);

        assert_eq!(collection.to_expolygons(), regions);
        for surface in &collection {
            assert_eq!(surface.surface_type, SurfaceType::InternalSolid);
            assert_eq!(surface.thickness, None);
            assert_eq!(surface.thickness_layers, 1);
            assert_eq!(surface.bridge_angle, None);
        }
    }

    #[test]
    fn test_append_with_template() {
        let mut template = Surface::bridge(square_mm(0.0, 0.0, 1.0), Some(0.7));
        template.set_thickness(0.4);
        template.set_thickness_layers(2);

        let regions = vec![square_mm(0.0, 0.0, 10.0), frame_mm(20.0, 0.0)];
        let mut collection = SurfaceCollection::from_surfaces(vec![surface(SurfaceType::Top, None)]);
        collection.append_with_template(&regions, &template);

        assert_eq!(collection.len(), 3);
        for (surface, region) in collection.iter().skip(1).zip(&regions) {
            assert_eq!(&surface.expolygon, region);
            assert!(surface.same_properties(&template));
        }
    }

    #[test]
    fn test_set_and_set_type() {
        let mut collection = every_type();
        let regions = vec![square_mm(0.0, 0.0, 10.0)];
        collection.set_with_type(&regions, SurfaceType::Top);
        assert_eq!(types_of(&collection), vec![SurfaceType::Top]);

        let other = every_type();
        collection.set(&other);
        assert_eq!(collection, other);

        collection.set_type(SurfaceType::InternalVoid);
        assert!(collection
            .iter()
            .all(|s| s.surface_type == SurfaceType::InternalVoid));
    }

    #[test]
    fn test_polygons_count_matches_to_polygons() {
        let collection = SurfaceCollection::from_surfaces(vec![
            Surface::top(square_mm(0.0, 0.0, 10.0)),
            Surface::internal(frame_mm(20.0, 0.0)),
            Surface::bottom(frame_mm(40.0, 0.0)),
        ]);

        assert_eq!(collection.polygons_count(), 5);
        let polygons = collection.to_polygons();
        assert_eq!(polygons.len(), collection.polygons_count());

        // Contour first, then holes, surface by surface
        assert_eq!(polygons[0], collection[0].expolygon.contour);
        assert_eq!(polygons[1], collection[1].expolygon.contour);
        assert_eq!(polygons[2], collection[1].expolygon.holes[0]);
        assert_eq!(polygons[3], collection[2].expolygon.contour);

        assert_eq!(SurfaceCollection::new().polygons_count(), 0);
    }

    #[test]
    fn test_remove_type() {
        let mut collection = every_type();
        collection.push(surface(SurfaceType::Top, Some(0.2)));
        let original = collection.clone();

        collection.remove_type(SurfaceType::Top);
        assert!(collection.filter_by_type(SurfaceType::Top).is_empty());

        let expected: Vec<Surface> = original
            .iter()
            .filter(|s| s.surface_type != SurfaceType::Top)
            .cloned()
            .collect();
        assert_eq!(collection.surfaces, expected);
    }

    #[test]
    fn test_remove_types() {
        let mut collection = every_type();
        collection.remove_types(&[SurfaceType::Internal, SurfaceType::BottomBridge]);
        assert_eq!(
            types_of(&collection),
            vec![
                SurfaceType::Top,
                SurfaceType::Bottom,
                SurfaceType::InternalSolid,
                SurfaceType::InternalBridge,
                SurfaceType::InternalVoid,
            ]
        );

        collection.remove_types(&[]);
        assert_eq!(collection.len(), 5);
    }

    #[test]
    fn test_keep_types() {
        let mut collection = every_type();
        collection.push(surface(SurfaceType::Bottom, None));
        collection.push(surface(SurfaceType::Top, None));

        let kept = [SurfaceType::Top, SurfaceType::Bottom];
        let mut removed = collection.clone();
        let complement: Vec<SurfaceType> = SurfaceType::ALL
            .iter()
            .copied()
            .filter(|t| !kept.contains(t))
            .collect();
        removed.remove_types(&complement);

        collection.keep_types(&kept);
        assert_eq!(
            types_of(&collection),
            vec![
                SurfaceType::Top,
                SurfaceType::Bottom,
                SurfaceType::Bottom,
                SurfaceType::Top
            ]
        );
        assert_eq!(collection, removed);
    }

    #[test]
    fn test_keep_type_and_empty_set() {
        let mut collection = every_type();
        collection.keep_type(SurfaceType::InternalBridge);
        assert_eq!(types_of(&collection), vec![SurfaceType::InternalBridge]);

        collection.keep_types(&[]);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_filter_by_types() {
        let mut collection = every_type();
        let found = collection.filter_by_types(&[
            SurfaceType::InternalVoid,
            SurfaceType::Top,
            SurfaceType::Top,
        ]);
        // Collection order, one reference per surface
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].surface_type, SurfaceType::Top);
        assert_eq!(found[1].surface_type, SurfaceType::InternalVoid);
        assert!(std::ptr::eq(found[0], &collection.surfaces[0]));

        for surface in collection.filter_by_types_mut(&[SurfaceType::Internal]) {
            surface.set_thickness(0.3);
        }
        assert_eq!(collection[4].thickness, Some(0.3));
        assert_eq!(collection[3].thickness, None);
    }

    #[test]
    fn test_filter_by_type_polygons() {
        let collection = SurfaceCollection::from_surfaces(vec![
            Surface::bottom(frame_mm(0.0, 0.0)),
            Surface::top(square_mm(20.0, 0.0, 10.0)),
            Surface::bottom(square_mm(40.0, 0.0, 10.0)),
        ]);

        let mut out = vec![Polygon::rectangle(Point::new(0, 0), Point::new(10, 10))];
        collection.filter_by_type_polygons(SurfaceType::Bottom, &mut out);
        // Existing contents are kept
        assert_eq!(out.len(), 4);
        assert_eq!(out[1], collection[0].expolygon.contour);
        assert_eq!(out[3], collection[2].expolygon.contour);
    }

    #[test]
    fn test_filter_by_incl_type() {
        let collection = every_type();

        let mut bridges = Vec::new();
        collection.filter_by_incl_type(SurfaceTypeFlags::BRIDGE, &mut bridges);
        assert_eq!(bridges.len(), 2);
        assert_eq!(bridges[0], collection[2].expolygon.contour);
        assert_eq!(bridges[1], collection[5].expolygon.contour);

        let mut external = Vec::new();
        collection.filter_by_incl_type(
            SurfaceTypeFlags::TOP | SurfaceTypeFlags::BOTTOM,
            &mut external,
        );
        assert_eq!(external.len(), 3);

        let mut voids = Vec::new();
        collection.filter_by_incl_type(SurfaceType::InternalVoid, &mut voids);
        // INTERNAL bit is shared by every internal type
        assert_eq!(voids.len(), 4);

        let mut none = Vec::new();
        collection.filter_by_incl_type(SurfaceTypeFlags::empty(), &mut none);
        assert!(none.is_empty());
    }

    #[test]
    fn test_any_bottom_contains() {
        assert!(!SurfaceCollection::new().any_bottom_contains(&Point::new(0, 0)));

        let collection = SurfaceCollection::from_surfaces(vec![
            Surface::top(square_mm(0.0, 0.0, 10.0)),
            Surface::bottom(frame_mm(20.0, 0.0)),
            Surface::new(square_mm(40.0, 0.0, 10.0), SurfaceType::BottomBridge),
        ]);

        assert!(collection.any_bottom_contains(&Point::new_scale(21.0, 1.0)));
        assert!(collection.any_bottom_contains(&Point::new_scale(45.0, 5.0)));
        // Inside the hole of the bottom frame
        assert!(!collection.any_bottom_contains(&Point::new_scale(25.0, 5.0)));
        // Top only
        assert!(!collection.any_bottom_contains(&Point::new_scale(5.0, 5.0)));
    }

    #[test]
    fn test_any_internal_contains() {
        let collection = SurfaceCollection::from_surfaces(vec![
            Surface::bottom(square_mm(0.0, 0.0, 10.0)),
            Surface::internal(frame_mm(20.0, 0.0)),
            Surface::new(square_mm(40.0, 0.0, 10.0), SurfaceType::InternalVoid),
        ]);

        assert!(!collection.any_internal_contains(&Point::new_scale(5.0, 5.0)));
        assert!(collection.any_internal_contains(&Point::new_scale(45.0, 5.0)));

        let along_band = Polyline::from_points(vec![
            Point::new_scale(21.0, 1.0),
            Point::new_scale(21.0, 9.0),
        ]);
        assert!(collection.any_internal_contains(&along_band));

        let across_hole = Polyline::from_points(vec![
            Point::new_scale(21.0, 5.0),
            Point::new_scale(29.0, 5.0),
        ]);
        assert!(!collection.any_internal_contains(&across_hole));
        assert!(!collection.any_internal_contains(&Polyline::new()));
    }

    #[test]
    fn test_containment_through_hole_corners() {
        // 1mm hole at (3,3); the diagonal touches it only at its corners
        let mut hole = Polygon::rectangle(Point::new_scale(3.0, 3.0), Point::new_scale(4.0, 4.0));
        hole.make_clockwise();
        let region = ExPolygon::with_holes(
            Polygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(10.0, 10.0)),
            vec![hole],
        );
        let collection = SurfaceCollection::from_surfaces(vec![
            Surface::internal(region.clone()),
            Surface::bottom(region),
        ]);

        let diagonal = Polyline::from_points(vec![
            Point::new_scale(2.5, 2.5),
            Point::new_scale(9.5, 9.5),
        ]);
        assert!(!collection.any_internal_contains(&diagonal));
        assert!(!collection.any_bottom_contains(&diagonal));

        let beside_hole = Polyline::from_points(vec![
            Point::new_scale(5.0, 1.0),
            Point::new_scale(9.0, 9.0),
        ]);
        assert!(collection.any_internal_contains(&beside_hole));
        assert!(collection.any_bottom_contains(&beside_hole));
    }

    #[test]
    fn test_simplify_preserves_classification() {
        let mut bridge = Surface::bridge(frame_mm(0.0, 0.0), Some(1.0));
        bridge.set_thickness(0.4);
        let mut collection = SurfaceCollection::from_surfaces(vec![
            bridge.clone(),
            Surface::top(square_mm(20.0, 0.0, 10.0)),
        ]);

        collection.simplify(0.01);
        assert_eq!(collection.len(), 2);
        assert!(collection[0].same_properties(&bridge));
        assert_eq!(collection[0].expolygon.holes.len(), 1);
        assert_eq!(collection[1].surface_type, SurfaceType::Top);
        assert!(collection.validate().is_ok());
    }

    #[test]
    fn test_simplify_with_splits_and_drops() {
        let mut first = surface(SurfaceType::Internal, Some(0.2));
        first.extra_perimeters = 1;
        let mut collection = SurfaceCollection::from_surfaces(vec![
            first.clone(),
            surface(SurfaceType::Top, None),
            surface(SurfaceType::Bottom, Some(0.3)),
        ]);

        // Internal splits in two, Top vanishes, Bottom stays whole
        let halves = vec![square_mm(0.0, 0.0, 5.0), square_mm(5.0, 0.0, 5.0)];
        let mut call = 0;
        collection.simplify_with(|expoly| {
            call += 1;
            match call {
                1 => halves.clone(),
                2 => Vec::new(),
                _ => vec![expoly.clone()],
            }
        });

        assert_eq!(
            types_of(&collection),
            vec![SurfaceType::Internal, SurfaceType::Internal, SurfaceType::Bottom]
        );
        assert_eq!(collection[0].expolygon, halves[0]);
        assert_eq!(collection[1].expolygon, halves[1]);
        assert!(collection[0].same_properties(&first));
        assert!(collection[1].same_properties(&first));
        assert_eq!(collection[1].extra_perimeters, 1);
        assert_eq!(collection[2].thickness, Some(0.3));
    }

    #[test]
    fn test_simplify_drops_collapsed_surface() {
        let sliver = ExPolygon::new(Polygon::from_points(vec![
            Point::new_scale(0.0, 0.0),
            Point::new_scale(10.0, 0.0),
            Point::new_scale(10.0, 0.01),
            Point::new_scale(0.0, 0.01),
        ]));
        let mut collection = SurfaceCollection::from_surfaces(vec![
            Surface::top(sliver),
            Surface::internal(square_mm(20.0, 0.0, 10.0)),
        ]);

        collection.simplify(0.1);
        assert_eq!(types_of(&collection), vec![SurfaceType::Internal]);
    }

    #[test]
    fn test_group_by_properties() {
        let a = surface(SurfaceType::Top, Some(1.0));
        let b = surface(SurfaceType::Top, Some(1.0));
        let c = surface(SurfaceType::Bottom, Some(1.0));
        let collection = SurfaceCollection::from_surfaces(vec![a, b, c]);

        let groups = collection.group_by_properties();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert!(std::ptr::eq(groups[0][0], &collection.surfaces[0]));
        assert!(std::ptr::eq(groups[0][1], &collection.surfaces[1]));
        assert_eq!(groups[1].len(), 1);
        assert!(std::ptr::eq(groups[1][0], &collection.surfaces[2]));
    }

    #[test]
    fn test_group_by_properties_order_of_first_appearance() {
        let mut layered = surface(SurfaceType::Internal, Some(0.2));
        layered.thickness_layers = 2;
        let collection = SurfaceCollection::from_surfaces(vec![
            surface(SurfaceType::Internal, Some(0.2)),
            layered.clone(),
            surface(SurfaceType::Internal, Some(0.2)),
            layered,
            surface(SurfaceType::Internal, None),
        ]);

        let groups = collection.group_by_properties();
        let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(groups[1][0].thickness_layers, 2);
        assert_eq!(groups[2][0].thickness, None);
        assert!(SurfaceCollection::new().group_by_properties().is_empty());
    }

    #[test]
    fn test_group_by_mergeability() {
        let mut collection = SurfaceCollection::from_surfaces(vec![
            surface(SurfaceType::Top, Some(1.0)),
            surface(SurfaceType::Bottom, Some(1.0)),
            surface(SurfaceType::Top, Some(1.0)),
        ]);

        let mut groups = collection.group_by_mergeability(&surfaces_could_merge);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);

        // Mutable references into the live collection
        for surface in groups[0].iter_mut() {
            surface.set_bridge_angle(0.5);
        }
        drop(groups);
        assert_eq!(collection[0].bridge_angle, Some(0.5));
        assert_eq!(collection[1].bridge_angle, None);
        assert_eq!(collection[2].bridge_angle, Some(0.5));
    }

    #[test]
    fn test_group_by_mergeability_compares_first_member_only() {
        let mut collection = SurfaceCollection::from_surfaces(vec![
            surface(SurfaceType::Internal, Some(0.0)),
            surface(SurfaceType::Internal, Some(1.0)),
            surface(SurfaceType::Internal, Some(2.0)),
        ]);

        // Not transitive: 0 ~ 1 and 1 ~ 2, but 0 !~ 2
        let close = |a: &Surface, b: &Surface| match (a.thickness, b.thickness) {
            (Some(x), Some(y)) => (x - y).abs() <= 1.0,
            _ => false,
        };

        let groups = collection.group_by_mergeability(&close);
        let thicknesses: Vec<Vec<Option<CoordF>>> = groups
            .iter()
            .map(|g| g.iter().map(|s| s.thickness).collect())
            .collect();
        assert_eq!(
            thicknesses,
            vec![vec![Some(0.0), Some(1.0)], vec![Some(2.0)]]
        );
    }

    #[test]
    fn test_group_by_mergeability_with_config() {
        let mut collection = SurfaceCollection::from_surfaces(vec![
            surface(SurfaceType::Internal, Some(0.20)),
            surface(SurfaceType::Internal, Some(0.22)),
            surface(SurfaceType::InternalSolid, Some(0.20)),
        ]);

        let exact = SurfaceMergeConfig::default();
        assert_eq!(collection.group_by_mergeability(&exact).len(), 3);

        let loose = SurfaceMergeConfig::new().thickness_tolerance(0.05);
        assert_eq!(collection.group_by_mergeability(&loose).len(), 2);

        let dyn_predicate: &dyn MergePredicate = &loose;
        assert_eq!(collection.group_by_mergeability(dyn_predicate).len(), 2);
    }

    #[test]
    fn test_validate_reports_index() {
        let mut collection = every_type();
        assert!(collection.validate().is_ok());

        collection.push(Surface::default());
        match collection.validate() {
            Err(Error::InvalidSurface { index, reason }) => {
                assert_eq!(index, 7);
                assert!(reason.contains("contour"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_collection_traits() {
        let collection: SurfaceCollection = vec![
            surface(SurfaceType::Top, None),
            surface(SurfaceType::Bottom, None),
        ]
        .into_iter()
        .collect();
        assert_eq!(collection.len(), 2);

        let mut extended = SurfaceCollection::with_capacity(4);
        extended.extend(collection.clone());
        extended[1].set_type(SurfaceType::Internal);
        assert_eq!(extended[1].surface_type, SurfaceType::Internal);
        assert_eq!(extended.to_string(), "SurfaceCollection(2 surfaces)");

        let owned: Vec<Surface> = collection.into_iter().collect();
        assert_eq!(owned.len(), 2);
        assert_eq!(SurfaceCollection::from(owned).len(), 2);
    }
}
