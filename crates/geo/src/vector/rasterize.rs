//! Burns polygons into a raster grid.
//! A cell is inside a polygon when its center is inside (even-odd rule, holes are honored),
//! cells touched by an edge but with the center outside are not burned.

use geo_types::Polygon;

use crate::{Error, GeoReference, Result};

/// Returns a row major buffer that is `true` for every cell whose center lies in any of the polygons
pub fn rasterize_polygons(polygons: &[Polygon<f64>], geo_reference: &GeoReference) -> Result<Vec<bool>> {
    if !geo_reference.is_north_up() {
        return Err(Error::InvalidArgument("Rasterizing requires a north up raster".into()));
    }

    let size = geo_reference.raster_size();
    let cell_size = geo_reference.cell_size();
    if cell_size.x() <= 0.0 || cell_size.y() == 0.0 {
        return Err(Error::InvalidArgument(format!("Unsupported cell size for rasterizing: {cell_size:?}")));
    }

    let rows = size.rows.count().max(0) as usize;
    let cols = size.cols.count().max(0) as usize;
    let x0 = geo_reference.top_left().x();

    let mut burned = vec![false; size.cell_count()];
    let mut crossings = Vec::new();

    for row in 0..rows {
        let y = geo_reference.top_left().y() + (row as f64 + 0.5) * cell_size.y();
        let row_cells = &mut burned[row * cols..(row + 1) * cols];

        for polygon in polygons {
            crossings.clear();
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                for line in ring.lines() {
                    let (start, end) = (line.start, line.end);
                    if (start.y > y) != (end.y > y) {
                        crossings.push(start.x + (y - start.y) * (end.x - start.x) / (end.y - start.y));
                    }
                }
            }

            crossings.sort_by(f64::total_cmp);

            // Centers in [crossings[2k], crossings[2k + 1]) are inside
            for span in crossings.chunks_exact(2) {
                let first = first_center_at_or_after(span[0], x0, cell_size.x(), cols);
                let last = first_center_at_or_after(span[1], x0, cell_size.x(), cols);
                row_cells[first..last].iter_mut().for_each(|cell| *cell = true);
            }
        }
    }

    Ok(burned)
}

/// Index of the first column whose center x is not smaller than `x`, limited to `[0, cols]`
fn first_center_at_or_after(x: f64, x0: f64, cell_width: f64, cols: usize) -> usize {
    let col = ((x - x0) / cell_width - 0.5).ceil();
    if col <= 0.0 {
        0
    } else if col >= cols as f64 {
        cols
    } else {
        col as usize
    }
}
