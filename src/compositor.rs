use std::{io::Cursor, path::PathBuf, sync::Arc};

use geo::{
    MaskedRaster,
    geotiff::{self, BandReader, CogWriteOptions},
    raster::algo::clip_to_polygons,
};

use crate::{
    BoundaryResolver, BoundarySelector, Config, Error, RegionCatalog, RegionLabel, Result, StaticRegionCatalog, classify,
    response::OutputVariant,
};

/// A source raster clipped to a region boundary
#[derive(Debug, Clone)]
pub struct ClippedLayer {
    pub label: RegionLabel,
    pub raster: MaskedRaster,
}

/// An encoded geotiff with the label of the region it was clipped to
#[derive(Debug, Clone)]
pub struct RenderedLayer {
    pub label: RegionLabel,
    pub tiff: Cursor<Vec<u8>>,
}

/// Clips the hazard, impact and adaptation rasters to administrative boundaries and encodes them as
/// cloud optimized geotiffs. Every call works on freshly opened files, nothing is cached.
#[derive(Clone)]
pub struct RasterCompositor {
    config: Config,
    boundaries: BoundaryResolver,
    cog_options: CogWriteOptions,
}

impl RasterCompositor {
    pub fn new(config: Config, catalog: Arc<dyn RegionCatalog>) -> Self {
        RasterCompositor {
            boundaries: BoundaryResolver::new(config.boundary_dir.clone(), catalog),
            config,
            cog_options: CogWriteOptions::default(),
        }
    }

    /// Creates the compositor with the region catalog file of the configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let catalog = match &config.region_catalog {
            Some(path) => StaticRegionCatalog::from_file(path)?,
            None => {
                log::warn!("No region catalog configured, only the total study area can be labeled");
                StaticRegionCatalog::new()
            }
        };

        Ok(Self::new(config, Arc::new(catalog)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn boundaries(&self) -> &BoundaryResolver {
        &self.boundaries
    }

    fn existing_source_path(&self, source_file: &str) -> Result<PathBuf> {
        let path = self.config.source_path(source_file)?;
        if !path.is_file() {
            log::debug!("Raster file not found: {}", path.display());
            return Err(Error::RasterFileNotFound(path));
        }

        Ok(path)
    }

    /// Clips the source raster to the boundary, fails with `NoDataInRegion` when no valid cell remains
    pub fn clip(&self, selector: BoundarySelector, source_file: &str) -> Result<ClippedLayer> {
        let boundary = self.boundaries.resolve(selector)?;
        let path = self.existing_source_path(source_file)?;

        let mut source = BandReader::open(&path)?;
        let clipped = clip_to_polygons(&mut source, boundary.polygons())?;

        match clipped {
            Some(raster) if !raster.is_fully_masked() => {
                log::debug!(
                    "Clipped {} to {}: {} of {} cells valid",
                    path.display(),
                    boundary.label,
                    raster.valid_count(),
                    raster.size().cell_count()
                );
                Ok(ClippedLayer {
                    label: boundary.label,
                    raster,
                })
            }
            _ => Err(Error::NoDataInRegion(boundary.label.to_string())),
        }
    }

    /// Clips the source raster and encodes the requested variant, the color ramp is only used for the colorized variant
    pub fn render<S: AsRef<str>>(
        &self,
        selector: BoundarySelector,
        source_file: &str,
        variant: OutputVariant,
        hex_colors: &[S],
    ) -> Result<RenderedLayer> {
        let (label, tiff) = match variant {
            OutputVariant::Colorized => {
                let ramp = classify::parse_color_ramp(hex_colors)?;
                let layer = self.clip(selector, source_file)?;
                let image = classify::colorize(&layer.raster, &ramp);
                let tiff = geotiff::write_cog_rgba(&image.geo_reference, &image.pixels, &self.cog_options)?;
                (layer.label, tiff)
            }
            OutputVariant::Raw => {
                let layer = self.clip(selector, source_file)?;
                let tiff = geotiff::write_cog_band(layer.raster.geo_reference(), &layer.raster.filled_with_nan(), &self.cog_options)?;
                (layer.label, tiff)
            }
        };

        Ok(RenderedLayer {
            label,
            tiff: Cursor::new(tiff),
        })
    }

    /// The colorized display variant: an RGBA cloud optimized geotiff.
    /// The colors of the ramp are assigned to the values `1..=len`.
    pub fn render_colorized<S: AsRef<str>>(
        &self,
        selector: BoundarySelector,
        source_file: &str,
        hex_colors: &[S],
    ) -> Result<Cursor<Vec<u8>>> {
        Ok(self.render(selector, source_file, OutputVariant::Colorized, hex_colors)?.tiff)
    }

    /// The raw analysis variant: a single `f64` band with NaN for every invalid cell
    pub fn render_raw(&self, selector: BoundarySelector, source_file: &str) -> Result<Cursor<Vec<u8>>> {
        Ok(self.render::<&str>(selector, source_file, OutputVariant::Raw, &[])?.tiff)
    }
}
