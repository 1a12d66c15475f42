use crate::{GeoReference, RasterSize, raster::DenseRaster};

/// A raster with a validity mask of the same shape.
/// Cells are invalid when they are NaN or exactly zero.
#[derive(Clone, Debug)]
pub struct MaskedRaster {
    raster: DenseRaster,
    valid: Vec<bool>,
}

/// Zero counts as nodata for the climate layers
fn is_valid_value(value: f64) -> bool {
    !value.is_nan() && value != 0.0
}

impl MaskedRaster {
    pub fn from_raster(raster: DenseRaster) -> Self {
        let valid = raster.data().iter().map(|&value| is_valid_value(value)).collect();
        MaskedRaster { raster, valid }
    }

    pub fn raster(&self) -> &DenseRaster {
        &self.raster
    }

    pub fn geo_reference(&self) -> &GeoReference {
        self.raster.geo_reference()
    }

    pub fn size(&self) -> RasterSize {
        self.raster.size()
    }

    /// `true` for every valid cell, row major
    pub fn mask(&self) -> &[bool] {
        &self.valid
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&valid| valid).count()
    }

    pub fn is_fully_masked(&self) -> bool {
        !self.valid.iter().any(|&valid| valid)
    }

    /// The cell values with every invalid cell set to NaN
    pub fn filled_with_nan(&self) -> Vec<f64> {
        self.raster
            .data()
            .iter()
            .zip(&self.valid)
            .map(|(&value, &valid)| if valid { value } else { f64::NAN })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, testutils};

    #[test]
    fn zero_and_nan_are_masked() -> Result<()> {
        let raster = DenseRaster::new(testutils::geo_reference(2, 3), vec![1.0, 0.0, f64::NAN, 4.0, -2.0, 0.5])?;
        let masked = MaskedRaster::from_raster(raster);

        assert_eq!(masked.mask(), &[true, false, false, true, true, true]);
        assert_eq!(masked.valid_count(), 4);
        assert!(!masked.is_fully_masked());
        assert_eq!(masked.mask().len(), masked.size().cell_count());

        let filled = masked.filled_with_nan();
        assert_eq!(filled[0], 1.0);
        assert!(filled[1].is_nan());
        assert!(filled[2].is_nan());
        assert_eq!(&filled[3..], &[4.0, -2.0, 0.5]);
        Ok(())
    }

    #[test]
    fn fully_masked() {
        let masked = MaskedRaster::from_raster(DenseRaster::filled_with(testutils::geo_reference(2, 2), 0.0));
        assert!(masked.is_fully_masked());
        assert_eq!(masked.valid_count(), 0);
    }
}
