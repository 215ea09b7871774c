//! Raster data structures

pub mod d8;
mod element;
mod geotransform;
mod grid;

pub use d8::Direction;
pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
