//! Terrain derivatives consumed by the wetness/infiltration indices

pub(crate) mod slope;
pub(crate) mod twi;

pub use slope::{slope, Slope, SlopeParams, SlopeUnits};
pub use twi::wetness_index;
