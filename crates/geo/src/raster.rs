//! In-memory raster types and the raster algorithms operating on them.

pub mod algo;
mod denseraster;
mod maskedraster;

#[doc(inline)]
pub use denseraster::DenseRaster;
#[doc(inline)]
pub use maskedraster::MaskedRaster;

use crate::{Cell, GeoReference, RasterSize, Result};

/// A raster from which rectangular windows of cells can be read, e.g. an in-memory raster or a geotiff on disk
pub trait RasterWindowSource {
    fn geo_reference(&self) -> &GeoReference;

    /// Reads the cells of the window, the window must be located within the raster
    fn read_window(&mut self, top_left: Cell, size: RasterSize) -> Result<DenseRaster>;
}
