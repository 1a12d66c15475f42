use crate::{
    ColorRamp,
    color::{self, Color},
    colormapper::{self, ColorMapper},
};

/// Options for mapping values that can not be mapped by the legend mapper
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug)]
pub struct MappingConfig {
    /// The color of the nodata pixels
    pub nodata_color: Color,
    /// Render 0 values as nodata
    pub zero_is_nodata: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            nodata_color: color::TRANSPARENT,
            zero_is_nodata: false,
        }
    }
}

impl MappingConfig {
    pub fn new(nodata: Color, zero_is_nodata: bool) -> Self {
        MappingConfig {
            nodata_color: nodata,
            zero_is_nodata,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Debug)]
pub struct MappedLegend<TMapper: ColorMapper> {
    pub mapper: TMapper,
    pub mapping_config: MappingConfig,
}

impl<TMapper: ColorMapper> MappedLegend<TMapper> {
    pub fn with_mapper(mapper: TMapper, mapping_config: MappingConfig) -> Self {
        MappedLegend { mapper, mapping_config }
    }

    fn is_unmappable(&self, value: f64, nodata: Option<f64>) -> bool {
        value.is_nan() || Some(value) == nodata || (self.mapping_config.zero_is_nodata && value == 0.0)
    }

    #[inline]
    pub fn color_for_value(&self, value: f64, nodata: Option<f64>) -> Color {
        if self.is_unmappable(value, nodata) {
            return self.mapping_config.nodata_color;
        }

        self.mapper.color_for_numeric_value(value, &self.mapping_config)
    }

    /// Maps every value of the buffer, the output has the same length as the input
    pub fn apply_to_data(&self, data: &[f64], nodata: Option<f64>) -> Vec<Color> {
        data.iter().map(|&value| self.color_for_value(value, nodata)).collect()
    }
}

pub type CategoricNumericLegend = MappedLegend<colormapper::CategoricNumeric>;

/// Categoric legend for a color ramp: value `i + 1` is mapped on ramp color `i`
pub fn create_categoric_for_color_ramp(ramp: &ColorRamp, mapping_config: Option<MappingConfig>) -> CategoricNumericLegend {
    MappedLegend::with_mapper(
        colormapper::CategoricNumeric::for_color_ramp(ramp),
        mapping_config.unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    fn ramp() -> Result<ColorRamp> {
        ColorRamp::from_hex_colors(&["#FF0000", "#00FF00", "#0000FF"])
    }

    #[test]
    fn categoric_legend() -> Result<()> {
        let legend = create_categoric_for_color_ramp(&ramp()?, None);

        assert_eq!(legend.color_for_value(1.0, None), color::RED);
        assert_eq!(legend.color_for_value(2.0, None), color::GREEN);
        assert_eq!(legend.color_for_value(3.0, None), color::BLUE);
        assert_eq!(legend.color_for_value(4.0, None), color::TRANSPARENT);
        assert_eq!(legend.color_for_value(f64::NAN, None), color::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn categoric_legend_nodata() -> Result<()> {
        let nodata_color = color::BLACK;
        let legend = create_categoric_for_color_ramp(&ramp()?, Some(MappingConfig::new(nodata_color, true)));

        assert_eq!(legend.color_for_value(2.0, Some(2.0)), nodata_color);
        assert_eq!(legend.color_for_value(0.0, None), nodata_color);
        assert_eq!(legend.color_for_value(7.0, None), nodata_color);
        assert_eq!(legend.color_for_value(3.0, Some(2.0)), color::BLUE);
        Ok(())
    }

    #[test]
    fn apply_to_data() -> Result<()> {
        let legend = create_categoric_for_color_ramp(&ramp()?, None);
        let colors = legend.apply_to_data(&[1.0, 0.0, 3.0, f64::NAN, 2.5], None);

        assert_eq!(
            colors,
            vec![color::RED, color::TRANSPARENT, color::BLUE, color::TRANSPARENT, color::TRANSPARENT]
        );
        Ok(())
    }
}
