//! Layer surfaces.
//!
//! This module contains the classified regions of a sliced layer:
//! - [`SurfaceType`] / [`SurfaceTypeFlags`] - Classification tags and their bit encoding
//! - [`Surface`] - A classified region with its print parameters
//! - [`SurfaceCollection`] - The ordered set of surfaces of one layer region
//! - [`MergePredicate`] - Decides which surfaces may share one infill pass

mod surface;
mod surface_collection;

pub use surface::{surfaces_could_merge, Surface, SurfaceType, SurfaceTypeFlags, Surfaces};
pub use surface_collection::{MergePredicate, SurfaceCollection};
