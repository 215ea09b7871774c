//! # Rivulet Core
//!
//! Core types for the Rivulet surface-water drainage library.
//!
//! This crate provides:
//! - [`Raster<T>`](raster::Raster): georeferenced raster grid
//! - [`GeoTransform`]: affine grid-to-geocoordinate transform
//! - [`raster::d8`]: the D8 flow topology shared by all routing stages
//! - [`vector`]: stream network polyline types
//! - [`Algorithm`]: the trait every analysis step implements

pub mod crs;
pub mod error;
pub mod raster;
pub mod vector;

pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{Direction, GeoTransform, Raster, RasterElement};
pub use vector::{StreamLine, StreamNetwork};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Direction, GeoTransform, Raster, RasterElement};
    pub use crate::vector::{StreamLine, StreamNetwork};
    pub use crate::Algorithm;
}

/// Core trait for all analysis steps.
///
/// Algorithms are pure functions from input and parameters to output; no
/// state survives a call, so repeated invocations on identical input are
/// reproducible.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
