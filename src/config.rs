use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const DATA_ROOT_DIR_ENV: &str = "DATA_ROOT_DIR";
pub const BOUNDARY_DIR_ENV: &str = "BOUNDARY_DIR";
pub const REGION_CATALOG_ENV: &str = "REGION_CATALOG";

/// Locations of the read-only inputs of the compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source rasters are addressed relative to this directory
    pub data_root_dir: PathBuf,
    /// Directory containing `sa_outline.geojson`, `sa_countries`, `sa_states` and `sa_districts_c`
    pub boundary_dir: PathBuf,
    /// JSON file with the country and state names, regions have no names when absent
    pub region_catalog: Option<PathBuf>,
}

impl Config {
    pub fn new(data_root_dir: impl Into<PathBuf>, boundary_dir: impl Into<PathBuf>) -> Self {
        Config {
            data_root_dir: data_root_dir.into(),
            boundary_dir: boundary_dir.into(),
            region_catalog: None,
        }
    }

    pub fn with_region_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.region_catalog = Some(path.into());
        self
    }

    /// Reads the configuration from the `DATA_ROOT_DIR`, `BOUNDARY_DIR` and `REGION_CATALOG` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::InvalidArgument(format!("Environment variable {name} is not set")))
        };

        let mut config = Config::new(required(DATA_ROOT_DIR_ENV)?, required(BOUNDARY_DIR_ENV)?);
        if let Some(catalog) = lookup(REGION_CATALOG_ENV).filter(|value| !value.trim().is_empty()) {
            config = config.with_region_catalog(catalog);
        }

        Ok(config)
    }

    /// Resolves a raster path relative to the data root.
    /// Paths escaping the data root do not address a data file and are reported as `RasterFileNotFound`.
    pub fn source_path(&self, relative_path: &str) -> Result<PathBuf> {
        let relative = Path::new(relative_path);
        let escapes_root = relative
            .components()
            .any(|component| !matches!(component, std::path::Component::Normal(_) | std::path::Component::CurDir));

        if relative_path.trim().is_empty() || escapes_root {
            log::warn!("Rejected source file outside of the data root: '{relative_path}'");
            return Err(Error::RasterFileNotFound(relative.to_path_buf()));
        }

        Ok(self.data_root_dir.join(relative))
    }
}
