use geo::{GeoReference, MaskedRaster};
use inf::{
    ColorRamp,
    color::{self, Color},
    legend::{self, MappingConfig},
};

use crate::{Error, Result};

/// RGBA image derived from a clipped raster, pixels are interleaved
#[derive(Debug, Clone, PartialEq)]
pub struct CompositedImage {
    pub geo_reference: GeoReference,
    pub pixels: Vec<u8>,
}

/// Parses the hex colors of a ramp, ramp colors are always fully opaque
pub fn parse_color_ramp<S: AsRef<str>>(hex_colors: &[S]) -> Result<ColorRamp> {
    ColorRamp::from_hex_colors(hex_colors).map_err(|err| Error::InvalidArgument(format!("Invalid color ramp: {err}")))
}

/// Paints the valid cells that hold an integer value in `1..=ramp.len()` with the ramp color at position `value - 1`.
/// Other values and masked cells are transparent.
pub fn colorize(raster: &MaskedRaster, ramp: &ColorRamp) -> CompositedImage {
    let legend = legend::create_categoric_for_color_ramp(ramp, Some(MappingConfig::new(color::TRANSPARENT, true)));

    let mut colors = legend.apply_to_data(raster.raster().data(), None);
    colors
        .iter_mut()
        .zip(raster.mask())
        .filter(|(_, valid)| !**valid)
        .for_each(|(color, _)| *color = color::TRANSPARENT);

    CompositedImage {
        geo_reference: raster.geo_reference().clone(),
        pixels: colors.iter().flat_map(Color::to_rgba).collect(),
    }
}
