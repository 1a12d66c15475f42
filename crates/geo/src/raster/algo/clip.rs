use geo_types::Polygon;

use crate::{
    Error, Result,
    raster::{MaskedRaster, RasterWindowSource},
    vector::{io::polygons_bbox, rasterize::rasterize_polygons},
};

/// Clips the raster to the union of the polygons.
///
/// The result covers the polygon extent snapped outward to the cell grid and limited to the raster extent,
/// its georeference is shifted to the window origin. Cells whose center is not inside any polygon are set to NaN.
/// The polygons are expected in the coordinate reference system of the raster.
/// Only the cells of the window are read from the source.
///
/// Returns `None` when the polygons do not overlap the raster.
pub fn clip_to_polygons<S: RasterWindowSource>(source: &mut S, polygons: &[Polygon<f64>]) -> Result<Option<MaskedRaster>> {
    let geo_reference = source.geo_reference();
    if !geo_reference.is_north_up() {
        return Err(Error::InvalidArgument("Clipping a rotated raster is not supported".into()));
    }

    let Some(bounds) = polygons_bbox(polygons) else {
        log::debug!("No polygons to clip with");
        return Ok(None);
    };

    let Some((top_left, window_size)) = geo_reference.cell_window_for_bounds(&bounds) else {
        log::debug!("Clip bounds {:?} do not overlap the raster", bounds.to_bbox());
        return Ok(None);
    };

    log::debug!(
        "Clip window {window_size} at row {} col {} of {}",
        top_left.row,
        top_left.col,
        geo_reference.raster_size()
    );

    let mut window = source.read_window(top_left, window_size)?;
    let inside = rasterize_polygons(polygons, window.geo_reference())?;
    window
        .data_mut()
        .iter_mut()
        .zip(inside)
        .filter(|(_, inside)| !inside)
        .for_each(|(value, _)| *value = f64::NAN);

    Ok(Some(MaskedRaster::from_raster(window)))
}
