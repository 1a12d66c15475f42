//! Vector boundary input and polygon rasterization.

pub mod io;
pub mod rasterize;

#[doc(inline)]
pub use io::BoundaryGeometry;
