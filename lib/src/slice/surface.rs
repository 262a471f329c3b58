//! Surface types for layer regions.
//!
//! This module provides the Surface type representing classified regions
//! within a layer, mirroring BambuStudio's Surface class.
//!
//! # Surface Classification
//!
//! Every surface carries a [`SurfaceType`] tag. Tags are nameable enum
//! values, and each one also has a fixed bit encoding ([`SurfaceTypeFlags`])
//! so that callers can select whole families at once:
//!
//! | Tag              | Flags                         |
//! |------------------|-------------------------------|
//! | `Top`            | `TOP \| SOLID`                |
//! | `Bottom`         | `BOTTOM \| SOLID`             |
//! | `BottomBridge`   | `BOTTOM \| SOLID \| BRIDGE`   |
//! | `Internal`       | `INTERNAL \| SPARSE`          |
//! | `InternalSolid`  | `INTERNAL \| SOLID`           |
//! | `InternalBridge` | `INTERNAL \| SOLID \| BRIDGE` |
//! | `InternalVoid`   | `INTERNAL \| VOID`            |
//!
//! # BambuStudio Reference
//!
//! This module corresponds to:
//! - `src/libslic3r/Surface.hpp/cpp`

use crate::geometry::{ExPolygon, Polygons};
use crate::{CoordF, Error, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

bitflags! {
    /// Bit encoding of surface classifications.
    ///
    /// Position bits (`TOP`, `BOTTOM`, `INTERNAL`), density bits (`SOLID`,
    /// `SPARSE`, `VOID`) and the `BRIDGE` modifier combine into the tags of
    /// [`SurfaceType`]. Used as a mask by
    /// [`SurfaceCollection::filter_by_incl_type`](super::SurfaceCollection::filter_by_incl_type).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SurfaceTypeFlags: u16 {
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const INTERNAL = 1 << 2;
        const SOLID = 1 << 3;
        const SPARSE = 1 << 4;
        const VOID = 1 << 5;
        const BRIDGE = 1 << 6;
    }
}

/// Classification of a surface within a layer.
///
/// Surfaces are classified to determine how they should be filled:
/// - Top/bottom surfaces get solid infill
/// - Internal surfaces get sparse infill
/// - Bridge surfaces need special handling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Top surface (visible from above).
    Top,
    /// Bottom surface (visible from below, or first layer).
    Bottom,
    /// Bottom surface that bridges over air/support.
    BottomBridge,
    /// Internal solid surface (between top/bottom and infill).
    #[default]
    InternalSolid,
    /// Internal surface that will receive sparse infill.
    Internal,
    /// Internal bridge surface.
    InternalBridge,
    /// Internal void (empty space, no infill).
    InternalVoid,
}

impl SurfaceType {
    /// Every surface type, in declaration order.
    pub const ALL: [SurfaceType; 7] = [
        SurfaceType::Top,
        SurfaceType::Bottom,
        SurfaceType::BottomBridge,
        SurfaceType::InternalSolid,
        SurfaceType::Internal,
        SurfaceType::InternalBridge,
        SurfaceType::InternalVoid,
    ];

    /// The bit encoding of this tag.
    pub const fn flags(self) -> SurfaceTypeFlags {
        match self {
            SurfaceType::Top => SurfaceTypeFlags::TOP.union(SurfaceTypeFlags::SOLID),
            SurfaceType::Bottom => SurfaceTypeFlags::BOTTOM.union(SurfaceTypeFlags::SOLID),
            SurfaceType::BottomBridge => SurfaceTypeFlags::BOTTOM
                .union(SurfaceTypeFlags::SOLID)
                .union(SurfaceTypeFlags::BRIDGE),
            SurfaceType::InternalSolid => {
                SurfaceTypeFlags::INTERNAL.union(SurfaceTypeFlags::SOLID)
            }
            SurfaceType::Internal => SurfaceTypeFlags::INTERNAL.union(SurfaceTypeFlags::SPARSE),
            SurfaceType::InternalBridge => SurfaceTypeFlags::INTERNAL
                .union(SurfaceTypeFlags::SOLID)
                .union(SurfaceTypeFlags::BRIDGE),
            SurfaceType::InternalVoid => SurfaceTypeFlags::INTERNAL.union(SurfaceTypeFlags::VOID),
        }
    }

    /// Position of this tag in [`SurfaceType::ALL`].
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Check if any bit of `mask` is set in this tag's encoding.
    #[inline]
    pub fn intersects(self, mask: SurfaceTypeFlags) -> bool {
        self.flags().intersects(mask)
    }

    /// Check if this surface type is a top surface.
    #[inline]
    pub fn is_top(&self) -> bool {
        self.flags().contains(SurfaceTypeFlags::TOP)
    }

    /// Check if this surface type is a bottom surface.
    #[inline]
    pub fn is_bottom(&self) -> bool {
        self.flags().contains(SurfaceTypeFlags::BOTTOM)
    }

    /// Check if this surface type is a bridge.
    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.flags().contains(SurfaceTypeFlags::BRIDGE)
    }

    /// Check if this surface type requires solid infill.
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.flags().contains(SurfaceTypeFlags::SOLID)
    }

    /// Check if this surface type is internal (not top or bottom).
    #[inline]
    pub fn is_internal(&self) -> bool {
        self.flags().contains(SurfaceTypeFlags::INTERNAL)
    }

    /// Check if this surface type is external (top or bottom).
    #[inline]
    pub fn is_external(&self) -> bool {
        !self.is_internal()
    }

    /// Get a human-readable name for this surface type.
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceType::Top => "top",
            SurfaceType::Bottom => "bottom",
            SurfaceType::BottomBridge => "bottom bridge",
            SurfaceType::InternalSolid => "internal solid",
            SurfaceType::Internal => "internal",
            SurfaceType::InternalBridge => "internal bridge",
            SurfaceType::InternalVoid => "internal void",
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<SurfaceType> for SurfaceTypeFlags {
    #[inline]
    fn from(surface_type: SurfaceType) -> Self {
        surface_type.flags()
    }
}

impl BitOr for SurfaceType {
    type Output = SurfaceTypeFlags;

    #[inline]
    fn bitor(self, rhs: SurfaceType) -> SurfaceTypeFlags {
        self.flags() | rhs.flags()
    }
}

impl BitOr<SurfaceType> for SurfaceTypeFlags {
    type Output = SurfaceTypeFlags;

    #[inline]
    fn bitor(self, rhs: SurfaceType) -> SurfaceTypeFlags {
        self | rhs.flags()
    }
}

/// A surface is a classified region within a layer.
///
/// Each surface has a type (determining how it should be filled),
/// geometry (the ExPolygon defining its shape) and the print parameters
/// that decide whether it can share an infill pass with its neighbours.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// The geometry of this surface.
    pub expolygon: ExPolygon,

    /// The type/classification of this surface.
    pub surface_type: SurfaceType,

    /// Extrusion thickness in mm. None if not yet determined.
    pub thickness: Option<CoordF>,

    /// Number of layers this surface spans.
    pub thickness_layers: usize,

    /// Bridge angle in radians (for bridge surfaces).
    /// None if not a bridge or angle not yet determined.
    pub bridge_angle: Option<CoordF>,

    /// Extra perimeters needed for this surface.
    pub extra_perimeters: usize,
}

impl Surface {
    /// Create a new surface with the given geometry and type.
    pub fn new(expolygon: ExPolygon, surface_type: SurfaceType) -> Self {
        Self {
            expolygon,
            surface_type,
            thickness: None,
            thickness_layers: 1,
            bridge_angle: None,
            extra_perimeters: 0,
        }
    }

    /// Clone `template`'s classification and parameters onto new geometry.
    pub fn with_expolygon(template: &Surface, expolygon: ExPolygon) -> Self {
        Self {
            expolygon,
            ..template.clone_properties()
        }
    }

    /// Copy of this surface with empty geometry.
    fn clone_properties(&self) -> Self {
        Self {
            expolygon: ExPolygon::default(),
            surface_type: self.surface_type,
            thickness: self.thickness,
            thickness_layers: self.thickness_layers,
            bridge_angle: self.bridge_angle,
            extra_perimeters: self.extra_perimeters,
        }
    }

    /// Create a new top surface.
    pub fn top(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::Top)
    }

    /// Create a new bottom surface.
    pub fn bottom(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::Bottom)
    }

    /// Create a new internal surface.
    pub fn internal(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::Internal)
    }

    /// Create a new internal solid surface.
    pub fn internal_solid(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::InternalSolid)
    }

    /// Create a new bridge surface.
    pub fn bridge(expolygon: ExPolygon, angle: Option<CoordF>) -> Self {
        Self {
            bridge_angle: angle,
            ..Self::new(expolygon, SurfaceType::BottomBridge)
        }
    }

    /// Check if this surface is empty (no geometry).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.expolygon.is_empty()
    }

    /// Get the area of this surface (scaled units squared).
    #[inline]
    pub fn area(&self) -> CoordF {
        self.expolygon.area()
    }

    /// Flatten the geometry into polygons (contour first, then holes).
    #[inline]
    pub fn to_polygons(&self) -> Polygons {
        self.expolygon.to_polygons()
    }

    /// Check if this is a top surface.
    #[inline]
    pub fn is_top(&self) -> bool {
        self.surface_type.is_top()
    }

    /// Check if this is a bottom surface.
    #[inline]
    pub fn is_bottom(&self) -> bool {
        self.surface_type.is_bottom()
    }

    /// Check if this is a bridge surface.
    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.surface_type.is_bridge()
    }

    /// Check if this is a solid surface.
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.surface_type.is_solid()
    }

    /// Check if this is an internal surface.
    #[inline]
    pub fn is_internal(&self) -> bool {
        self.surface_type.is_internal()
    }

    /// Check if this is an external surface.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.surface_type.is_external()
    }

    /// True if both surfaces carry the same
    /// (type, thickness, thickness_layers, bridge_angle) tuple.
    pub fn same_properties(&self, other: &Surface) -> bool {
        self.surface_type == other.surface_type
            && self.thickness == other.thickness
            && self.thickness_layers == other.thickness_layers
            && self.bridge_angle == other.bridge_angle
    }

    /// Set the surface type.
    pub fn set_type(&mut self, surface_type: SurfaceType) {
        self.surface_type = surface_type;
    }

    /// Set the bridge angle.
    pub fn set_bridge_angle(&mut self, angle: CoordF) {
        self.bridge_angle = Some(angle);
    }

    /// Set the thickness.
    pub fn set_thickness(&mut self, thickness: CoordF) {
        self.thickness = Some(thickness);
    }

    /// Set the number of thickness layers.
    pub fn set_thickness_layers(&mut self, layers: usize) {
        self.thickness_layers = layers;
    }

    /// Check the geometry and parameters of this surface.
    pub fn validate(&self) -> Result<()> {
        self.expolygon.validate()?;
        if let Some(thickness) = self.thickness {
            if !thickness.is_finite() {
                return Err(Error::Geometry(format!("thickness is {}", thickness)));
            }
        }
        if let Some(angle) = self.bridge_angle {
            if !angle.is_finite() {
                return Err(Error::Geometry(format!("bridge angle is {}", angle)));
            }
        }
        Ok(())
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(ExPolygon::default(), SurfaceType::default())
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Surface({:?}, area={:.2}mm², thickness={:?}, layers={}, bridge_angle={:?})",
            self.surface_type,
            self.area() / (crate::SCALING_FACTOR * crate::SCALING_FACTOR),
            self.thickness,
            self.thickness_layers,
            self.bridge_angle
        )
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} surface (area={:.2}mm²)",
            self.surface_type,
            self.area() / (crate::SCALING_FACTOR * crate::SCALING_FACTOR)
        )
    }
}

impl From<ExPolygon> for Surface {
    fn from(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::default())
    }
}

/// Type alias for a collection of surfaces.
pub type Surfaces = Vec<Surface>;

/// Default mergeability predicate: surfaces merge when they share the same
/// (type, thickness, thickness_layers, bridge_angle) tuple.
///
/// Corresponds to libslic3r's `surfaces_could_merge()`.
#[inline]
pub fn surfaces_could_merge(a: &Surface, b: &Surface) -> bool {
    a.same_properties(b)
}
