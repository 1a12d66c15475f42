use std::fmt;

/// Number of rows in a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rows(pub i32);

/// Number of columns in a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Columns(pub i32);

impl Rows {
    pub const fn count(&self) -> i32 {
        self.0
    }
}

impl Columns {
    pub const fn count(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Mul<Columns> for Rows {
    type Output = usize;

    fn mul(self, cols: Columns) -> usize {
        self.0.max(0) as usize * cols.0.max(0) as usize
    }
}

/// Raster size represented by rows and columns.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterSize {
    pub rows: Rows,
    pub cols: Columns,
}

impl RasterSize {
    pub const fn with_rows_cols(rows: Rows, cols: Columns) -> Self {
        RasterSize { rows, cols }
    }

    pub const fn square(size: i32) -> Self {
        RasterSize {
            rows: Rows(size),
            cols: Columns(size),
        }
    }

    pub const fn empty() -> Self {
        Self::with_rows_cols(Rows(0), Columns(0))
    }

    pub const fn is_empty(&self) -> bool {
        self.rows.count() <= 0 || self.cols.count() <= 0
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn max_dimension(&self) -> i32 {
        if self.rows.count() > self.cols.count() {
            self.rows.count()
        } else {
            self.cols.count()
        }
    }

    /// Size of a reduced resolution level, each dimension is rounded up and never smaller than one
    pub fn downsampled(&self, factor: i32) -> RasterSize {
        let reduce = |count: i32| (count + factor - 1) / factor;
        RasterSize::with_rows_cols(Rows(reduce(self.rows.count()).max(1)), Columns(reduce(self.cols.count()).max(1)))
    }
}

impl fmt::Display for RasterSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(rows: {}, cols: {})", self.rows, self.cols)
    }
}

impl fmt::Debug for RasterSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_count() {
        assert_eq!(RasterSize::with_rows_cols(Rows(3), Columns(4)).cell_count(), 12);
        assert_eq!(RasterSize::empty().cell_count(), 0);
        assert!(RasterSize::empty().is_empty());
    }

    #[test]
    fn downsampled_rounds_up() {
        let size = RasterSize::with_rows_cols(Rows(300), Columns(513));
        assert_eq!(size.downsampled(2), RasterSize::with_rows_cols(Rows(150), Columns(257)));
        assert_eq!(size.downsampled(16), RasterSize::with_rows_cols(Rows(19), Columns(33)));
        assert_eq!(RasterSize::square(3).downsampled(16), RasterSize::square(1));
    }
}
