#![warn(clippy::unwrap_used)]

//! Clips climate risk rasters to administrative boundaries of South Asia and renders them as
//! colorized or raw cloud optimized geotiffs.

pub use error::Error;
pub type Result<T = ()> = std::result::Result<T, Error>;

mod boundary;
pub mod classify;
mod compositor;
mod config;
mod error;
mod region;
pub mod response;

#[doc(inline)]
pub use boundary::{BoundaryLayer, BoundaryResolver, DistrictsLayer, ResolvedBoundary};
#[doc(inline)]
pub use compositor::{ClippedLayer, RasterCompositor, RenderedLayer};
#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use region::{
    AdminLevel, BoundarySelector, RegionCatalog, RegionLabel, STUDY_AREA_NAME, StateRecord, StaticRegionCatalog, title_case,
};
