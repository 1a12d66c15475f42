use approx::{AbsDiffEq, RelativeEq};

use crate::{Cell, Columns, GeoTransform, Point, RasterSize, Rect, Rows, geotiff::ProjectionInfo};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSize {
    x: f64,
    y: f64,
}

impl AbsDiffEq for CellSize {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> <f64 as AbsDiffEq>::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: <f64 as AbsDiffEq>::Epsilon) -> bool {
        f64::abs_diff_eq(&self.x, &other.x, epsilon) && f64::abs_diff_eq(&self.y, &other.y, epsilon)
    }
}

impl RelativeEq for CellSize {
    fn default_max_relative() -> <f64 as AbsDiffEq>::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: <f64 as AbsDiffEq>::Epsilon,
        max_relative: <f64 as AbsDiffEq>::Epsilon,
    ) -> bool {
        f64::relative_eq(&self.x, &other.x, epsilon, max_relative)
            && f64::relative_eq(&self.y, &other.y, epsilon, max_relative)
    }
}

impl CellSize {
    pub const fn new(x: f64, y: f64) -> Self {
        CellSize { x, y }
    }

    /// Square cells for a north up raster (negative vertical size)
    pub const fn square(size: f64) -> Self {
        CellSize::new(size, -size)
    }

    pub fn is_valid(&self) -> bool {
        self.x != 0.0 && self.y != 0.0
    }

    pub const fn x(&self) -> f64 {
        self.x
    }

    pub const fn y(&self) -> f64 {
        self.y
    }
}

/// Represents the metadata associated with a raster so it can be georeferenced.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct GeoReference {
    /// The coordinate reference system, absent for rasters without GeoKeys
    projection: Option<ProjectionInfo>,
    /// The size of the image in pixels
    size: RasterSize,
    /// The affine transformation.
    geo_transform: GeoTransform,
    /// The nodata value.
    nodata: Option<f64>,
}

impl GeoReference {
    pub fn new(
        projection: Option<ProjectionInfo>,
        size: RasterSize,
        geo_transform: impl Into<GeoTransform>,
        nodata: Option<f64>,
    ) -> Self {
        GeoReference {
            projection,
            size,
            geo_transform: geo_transform.into(),
            nodata,
        }
    }

    pub fn with_top_left_origin(
        projection: Option<ProjectionInfo>,
        size: RasterSize,
        top_left: Point,
        cell_size: CellSize,
        nodata: Option<f64>,
    ) -> Self {
        GeoReference::new(
            projection,
            size,
            GeoTransform::from_top_left_and_cell_size(top_left, cell_size),
            nodata,
        )
    }

    pub fn raster_size(&self) -> RasterSize {
        self.size
    }

    pub fn rows(&self) -> Rows {
        self.size.rows
    }

    pub fn columns(&self) -> Columns {
        self.size.cols
    }

    pub fn geo_transform(&self) -> GeoTransform {
        self.geo_transform
    }

    pub fn cell_size(&self) -> CellSize {
        self.geo_transform.cell_size()
    }

    pub fn is_north_up(&self) -> bool {
        self.geo_transform.is_north_up()
    }

    pub fn projection(&self) -> Option<&ProjectionInfo> {
        self.projection.as_ref()
    }

    pub fn set_projection(&mut self, projection: Option<ProjectionInfo>) {
        self.projection = projection;
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<f64>) {
        self.nodata = nodata;
    }

    pub fn top_left(&self) -> Point<f64> {
        self.geo_transform.top_left()
    }

    pub fn bottom_right(&self) -> Point<f64> {
        self.geo_transform
            .apply(self.size.cols.count() as f64, self.size.rows.count() as f64)
    }

    pub fn cell_center(&self, cell: Cell) -> Point<f64> {
        self.geo_transform.cell_center(cell)
    }

    pub fn is_cell_on_map(&self, cell: Cell) -> bool {
        cell.is_valid() && cell.row < self.size.rows.count() && cell.col < self.size.cols.count()
    }

    pub fn bounding_box(&self) -> Rect<f64> {
        Rect::from_points(self.top_left(), self.bottom_right())
    }

    /// The cell window covering `bounds`: the bounds are snapped outward to the cell grid
    /// and limited to the raster extent. Returns `None` when the bounds do not overlap the raster.
    /// Only valid for north up rasters.
    pub fn cell_window_for_bounds(&self, bounds: &Rect<f64>) -> Option<(Cell, RasterSize)> {
        let x0 = self.geo_transform.top_left().x();
        let y0 = self.geo_transform.top_left().y();
        let cell_size = self.cell_size();

        let col_span = sorted((bounds.top_left().x() - x0) / cell_size.x(), (bounds.bottom_right().x() - x0) / cell_size.x());
        let row_span = sorted((bounds.top_left().y() - y0) / cell_size.y(), (bounds.bottom_right().y() - y0) / cell_size.y());

        let col_start = (col_span.0.floor() as i64).clamp(0, i64::from(self.size.cols.count()));
        let col_end = (col_span.1.ceil() as i64).clamp(0, i64::from(self.size.cols.count()));
        let row_start = (row_span.0.floor() as i64).clamp(0, i64::from(self.size.rows.count()));
        let row_end = (row_span.1.ceil() as i64).clamp(0, i64::from(self.size.rows.count()));

        if col_start >= col_end || row_start >= row_end {
            return None;
        }

        Some((
            Cell::from_row_col(row_start as i32, col_start as i32),
            RasterSize::with_rows_cols(Rows((row_end - row_start) as i32), Columns((col_end - col_start) as i32)),
        ))
    }

    /// Georeference of a window of this raster starting at `top_left`
    pub fn sub_reference(&self, top_left: Cell, size: RasterSize) -> GeoReference {
        GeoReference {
            projection: self.projection.clone(),
            size,
            geo_transform: self.geo_transform.with_offset(top_left),
            nodata: self.nodata,
        }
    }
}

fn sorted(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
