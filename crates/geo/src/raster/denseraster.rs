use crate::{Cell, Error, GeoReference, RasterSize, Result};

use super::RasterWindowSource;

/// Single band raster with `f64` cells, nodata cells are NaN
#[derive(Clone, Debug, PartialEq)]
pub struct DenseRaster {
    geo_reference: GeoReference,
    data: Vec<f64>,
}

impl DenseRaster {
    pub fn new(geo_reference: GeoReference, data: Vec<f64>) -> Result<Self> {
        let size = geo_reference.raster_size();
        if size.cell_count() != data.len() {
            return Err(Error::SizeMismatch {
                size1: (size.rows.count().max(0) as usize, size.cols.count().max(0) as usize),
                size2: (data.len(), 1),
            });
        }

        Ok(DenseRaster { geo_reference, data })
    }

    pub fn filled_with(geo_reference: GeoReference, value: f64) -> Self {
        let data = vec![value; geo_reference.raster_size().cell_count()];
        DenseRaster { geo_reference, data }
    }

    pub fn geo_reference(&self) -> &GeoReference {
        &self.geo_reference
    }

    pub fn size(&self) -> RasterSize {
        self.geo_reference.raster_size()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn cell_value(&self, cell: Cell) -> Option<f64> {
        if !self.geo_reference.is_cell_on_map(cell) {
            return None;
        }

        cell.index_in_raster(self.size().cols.count())
            .and_then(|index| self.data.get(index).copied())
    }

    /// Copies a window of the raster, the window must be located within the raster
    pub fn window(&self, top_left: Cell, size: RasterSize) -> Result<DenseRaster> {
        let bottom_right = Cell::from_row_col(top_left.row + size.rows.count() - 1, top_left.col + size.cols.count() - 1);
        if size.is_empty() || !self.geo_reference.is_cell_on_map(top_left) || !self.geo_reference.is_cell_on_map(bottom_right) {
            return Err(Error::InvalidArgument(format!(
                "Window {size} at ({}, {}) is not contained in raster {}",
                top_left.row,
                top_left.col,
                self.size()
            )));
        }

        let src_cols = self.size().cols.count() as usize;
        let win_cols = size.cols.count() as usize;
        let mut data = Vec::with_capacity(size.cell_count());
        for row in top_left.row..=bottom_right.row {
            let start = row as usize * src_cols + top_left.col as usize;
            data.extend_from_slice(&self.data[start..start + win_cols]);
        }

        DenseRaster::new(self.geo_reference.sub_reference(top_left, size), data)
    }
}

impl RasterWindowSource for DenseRaster {
    fn geo_reference(&self) -> &GeoReference {
        &self.geo_reference
    }

    fn read_window(&mut self, top_left: Cell, size: RasterSize) -> Result<DenseRaster> {
        self.window(top_left, size)
    }
}
