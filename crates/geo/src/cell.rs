/// Represents a point in the raster using row, col coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn from_row_col(row: i32, col: i32) -> Self {
        Cell { row, col }
    }

    pub const fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0
    }

    /// Linear index of the cell in a row major buffer
    pub fn index_in_raster(&self, cols_in_grid: i32) -> Option<usize> {
        if !self.is_valid() || self.col >= cols_in_grid {
            return None;
        }

        Some(self.row as usize * cols_in_grid as usize + self.col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_in_raster() {
        assert_eq!(Cell::from_row_col(0, 0).index_in_raster(5), Some(0));
        assert_eq!(Cell::from_row_col(2, 3).index_in_raster(5), Some(13));
        assert_eq!(Cell::from_row_col(2, 5).index_in_raster(5), None);
        assert_eq!(Cell::from_row_col(-1, 0).index_in_raster(5), None);
    }
}
