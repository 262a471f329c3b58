//! Surface merge configuration.
//!
//! [`SurfaceMergeConfig`] is the configurable form of the mergeability
//! predicate used by [`SurfaceCollection::group_by_mergeability`]. With the
//! default (exact) settings it agrees with [`surfaces_could_merge`].
//!
//! [`SurfaceCollection::group_by_mergeability`]: crate::slice::SurfaceCollection::group_by_mergeability
//! [`surfaces_could_merge`]: crate::slice::surfaces_could_merge

use crate::slice::{MergePredicate, Surface};
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decides which surfaces may share one infill pass.
///
/// Surface types must always match. Thickness and bridge angle are compared
/// within their tolerances; an unset value only matches another unset value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceMergeConfig {
    /// Maximum thickness difference (mm). 0 = exact match.
    pub thickness_tolerance: CoordF,
    /// Maximum bridge angle difference (radians). 0 = exact match.
    pub bridge_angle_tolerance: CoordF,
    /// Require equal `thickness_layers`.
    pub match_thickness_layers: bool,
}

impl SurfaceMergeConfig {
    /// Create a new SurfaceMergeConfig with default (exact) values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set thickness tolerance.
    pub fn thickness_tolerance(mut self, tolerance: CoordF) -> Self {
        self.thickness_tolerance = tolerance;
        self
    }

    /// Builder method: set bridge angle tolerance.
    pub fn bridge_angle_tolerance(mut self, tolerance: CoordF) -> Self {
        self.bridge_angle_tolerance = tolerance;
        self
    }

    /// Builder method: require or ignore equal layer counts.
    pub fn match_thickness_layers(mut self, enabled: bool) -> Self {
        self.match_thickness_layers = enabled;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.thickness_tolerance.is_finite() || self.thickness_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "thickness tolerance must be a non-negative number, got {}",
                self.thickness_tolerance
            )));
        }
        if !self.bridge_angle_tolerance.is_finite() || self.bridge_angle_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "bridge angle tolerance must be a non-negative number, got {}",
                self.bridge_angle_tolerance
            )));
        }
        Ok(())
    }

    /// Check whether two surfaces may be grouped under this configuration.
    pub fn could_merge(&self, a: &Surface, b: &Surface) -> bool {
        a.surface_type == b.surface_type
            && within(a.thickness, b.thickness, self.thickness_tolerance)
            && (!self.match_thickness_layers || a.thickness_layers == b.thickness_layers)
            && within(a.bridge_angle, b.bridge_angle, self.bridge_angle_tolerance)
    }
}

/// Unset matches unset; set values match within `tolerance`.
fn within(a: Option<CoordF>, b: Option<CoordF>, tolerance: CoordF) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= tolerance,
        (None, None) => true,
        _ => false,
    }
}

impl Default for SurfaceMergeConfig {
    fn default() -> Self {
        Self {
            thickness_tolerance: 0.0,
            bridge_angle_tolerance: 0.0,
            match_thickness_layers: true,
        }
    }
}

impl MergePredicate for SurfaceMergeConfig {
    fn could_merge(&self, a: &Surface, b: &Surface) -> bool {
        SurfaceMergeConfig::could_merge(self, a, b)
    }
}

impl fmt::Display for SurfaceMergeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SurfaceMergeConfig(thickness±{}mm, bridge angle±{}rad, match layers={})",
            self.thickness_tolerance, self.bridge_angle_tolerance, self.match_thickness_layers
        )
    }
}
