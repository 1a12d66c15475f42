use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("The requested raster data file is unavailable")]
    RasterFileNotFound(PathBuf),
    #[error("No data available for the selected inputs in {0}")]
    NoDataInRegion(String),
    #[error("Boundary not found: {0}")]
    BoundaryNotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Geo error: {0}")]
    GeoError(#[from] geo::Error),
    #[error("Infra error: {0}")]
    InfError(#[from] inf::Error),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Failures caused by the request itself, their message can be shown to the caller
    pub fn is_domain_failure(&self) -> bool {
        matches!(
            self,
            Error::RasterFileNotFound(_) | Error::NoDataInRegion(_) | Error::BoundaryNotFound(_) | Error::InvalidArgument(_)
        )
    }
}
