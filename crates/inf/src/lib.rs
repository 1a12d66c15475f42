#![warn(clippy::unwrap_used)]

pub use error::Error;
pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod color;
pub mod colormap;
mod colormapper;
mod error;
pub mod legend;

#[doc(inline)]
pub use color::Color;
#[doc(inline)]
pub use colormap::ColorRamp;
pub use colormapper::CategoricNumeric;
pub use colormapper::ColorMapper;
#[doc(inline)]
pub use legend::CategoricNumericLegend;
#[doc(inline)]
pub use legend::MappedLegend;
#[doc(inline)]
pub use legend::MappingConfig;
