use crate::{CellSize, Columns, GeoReference, Point, RasterSize, Rows, geotiff::ProjectionInfo};

/// North up WGS84 georeference with one degree cells starting at (70, 30)
pub fn geo_reference(rows: i32, cols: i32) -> GeoReference {
    GeoReference::with_top_left_origin(
        Some(ProjectionInfo::geographic(4326)),
        RasterSize::with_rows_cols(Rows(rows), Columns(cols)),
        Point::new(70.0, 30.0),
        CellSize::square(1.0),
        None,
    )
}
