use crate::{Color, ColorRamp, legend::MappingConfig};

use super::ColorMapper;

/// Categoric numeric color mapper (single integer value → color)
/// The categories form a contiguous value range which is stored as a lookup table,
/// mapping a value is a single index operation.
/// Values that are not exact integers or fall outside of the range get the nodata color.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Debug)]
pub struct CategoricNumeric {
    first_category: i64,
    lookup: Vec<u32>,
}

impl CategoricNumeric {
    /// Mapper for a color ramp, category `i + 1` gets the ramp color at position `i`
    pub fn for_color_ramp(ramp: &ColorRamp) -> Self {
        CategoricNumeric {
            first_category: 1,
            lookup: ramp.colors().iter().map(Color::to_bits).collect(),
        }
    }

    #[inline]
    fn lookup_index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value.fract() != 0.0 {
            return None;
        }

        let offset = value - self.first_category as f64;
        if offset < 0.0 || offset >= self.lookup.len() as f64 {
            return None;
        }

        Some(offset as usize)
    }
}

impl ColorMapper for CategoricNumeric {
    #[inline]
    fn color_for_numeric_value(&self, value: f64, config: &MappingConfig) -> Color {
        self.lookup_index(value)
            .map_or(config.nodata_color, |index| Color::from_bits(self.lookup[index]))
    }
}
