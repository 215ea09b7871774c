//! # Rivulet Algorithms
//!
//! Surface-water drainage analysis from digital elevation models.
//!
//! ## Modules
//!
//! - **hydrology**: D8 flow direction, flow accumulation, drainage
//!   threshold, stream network tracing, and the pipeline engine
//! - **terrain**: slope and topographic wetness index
//!
//! Algorithms take georeferenced [`rivulet_core::Raster`] grids and are
//! pure: no state survives a call. Pointwise stages parallelize over rows
//! when the `parallel` feature (default) is enabled.

pub mod hydrology;
pub(crate) mod maybe_rayon;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydrology::{
        accumulation_threshold, drainage_analysis, flow_accumulation, flow_direction,
        stream_mask, trace_streams, AccumulationMethod, DrainageAnalysis, DrainageEngine,
        DrainageParams, FlowAccumulation, FlowAccumulationParams, FlowDirection,
    };
    pub use crate::terrain::{slope, wetness_index, Slope, SlopeParams, SlopeUnits};
    pub use rivulet_core::prelude::*;
}
