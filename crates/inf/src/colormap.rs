use crate::{Color, Result};

/// Ordered list of colors for categoric rasters.
/// The color at position `i` is used for the category value `i + 1`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ColorRamp {
    colors: Vec<Color>,
}

impl ColorRamp {
    pub fn new(colors: Vec<Color>) -> Self {
        ColorRamp { colors }
    }

    /// Creates the ramp from hex strings, every color is made fully opaque
    pub fn from_hex_colors<S: AsRef<str>>(hex_colors: &[S]) -> Result<Self> {
        let colors = hex_colors
            .iter()
            .map(|hex| Color::from_hex_string(hex.as_ref()).map(|c| c.with_alpha(255)))
            .collect::<Result<Vec<Color>>>()?;

        Ok(ColorRamp { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// The color for a category value, `None` when the value has no position in the ramp
    pub fn color_for_category(&self, category: i64) -> Option<Color> {
        if category < 1 {
            return None;
        }

        usize::try_from(category - 1).ok().and_then(|index| self.colors.get(index).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_positions_are_one_based() -> Result<()> {
        let ramp = ColorRamp::from_hex_colors(&["#4682B4", "#87CEFA", "#E7E6A8"])?;
        assert_eq!(ramp.len(), 3);
        assert_eq!(ramp.color_for_category(0), None);
        assert_eq!(ramp.color_for_category(1), Some(Color::rgb(70, 130, 180)));
        assert_eq!(ramp.color_for_category(3), Some(Color::rgb(231, 230, 168)));
        assert_eq!(ramp.color_for_category(4), None);
        assert_eq!(ramp.color_for_category(-1), None);
        Ok(())
    }

    #[test]
    fn ramp_colors_are_opaque() -> Result<()> {
        let ramp = ColorRamp::from_hex_colors(&["#FF000000"])?;
        assert_eq!(ramp.colors()[0], Color::rgb(255, 0, 0));
        Ok(())
    }

    #[test]
    fn ramp_rejects_invalid_entries() {
        assert!(ColorRamp::from_hex_colors(&["#FF0000", "not a color"]).is_err());
    }
}
