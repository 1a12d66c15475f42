use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Raster dimensions do not match ({}x{}) <-> ({}x{})", .size1.0, .size1.1, .size2.0, .size2.1)]
    SizeMismatch {
        size1: (usize, usize),
        size2: (usize, usize),
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Error: {0}")]
    InfError(#[from] inf::Error),
    #[error("TIFF error: {0}")]
    TiffError(#[from] tiff::TiffError),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(#[from] geojson::Error),
}
