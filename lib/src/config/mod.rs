//! Configuration types.
//!
//! This module provides the settings that steer how surfaces are grouped
//! into shared processing batches.

mod merge_config;

pub use merge_config::SurfaceMergeConfig;
