#![warn(clippy::unwrap_used)]

pub type Result<T = ()> = std::result::Result<T, Error>;
mod cell;
mod error;
mod georeference;
mod geotransform;
pub mod geotiff;
mod nodata;
pub mod raster;
mod rastersize;
pub mod rect;
#[cfg(test)]
mod testutils;
pub mod vector;

#[doc(inline)]
pub use cell::Cell;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use georeference::CellSize;
#[doc(inline)]
pub use georeference::GeoReference;
#[doc(inline)]
pub use geotransform::GeoTransform;
pub use nodata::Nodata;
#[doc(inline)]
pub use raster::DenseRaster;
#[doc(inline)]
pub use raster::MaskedRaster;
pub use rastersize::Columns;
pub use rastersize::RasterSize;
pub use rastersize::Rows;
#[doc(inline)]
pub use rect::Rect;

pub type Point<T = f64> = geo_types::Point<T>;
