use crate::Color;
use crate::legend::MappingConfig;

mod categoric;

pub use categoric::CategoricNumeric;

/// Trait for implementing color mappers
pub trait ColorMapper: Default {
    fn color_for_numeric_value(&self, value: f64, config: &MappingConfig) -> Color;
}
