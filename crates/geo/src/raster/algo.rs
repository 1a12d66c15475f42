//! Algorithms for raster data processing.

mod clip;

pub use clip::clip_to_polygons;
