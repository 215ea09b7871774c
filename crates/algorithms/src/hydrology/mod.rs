//! Flow routing and stream network extraction
//!
//! The drainage pipeline from a DEM:
//! - Flow direction: D8 steepest-descent neighbor per cell
//! - Flow accumulation: upstream cell counts to a fixed point
//! - Threshold: percentile-based channel cutoff
//! - Stream network: traced polylines of over-threshold cells
//! - Drainage engine: the above as one call

pub(crate) mod drainage;
pub(crate) mod flow_accumulation;
pub(crate) mod flow_direction;
pub(crate) mod stream_network;
pub(crate) mod threshold;

pub use drainage::{drainage_analysis, DrainageAnalysis, DrainageEngine, DrainageParams};
pub use flow_accumulation::{
    flow_accumulation, AccumulationMethod, FlowAccumulation, FlowAccumulationParams,
};
pub use flow_direction::{flow_direction, FlowDirection};
pub use stream_network::{stream_mask, trace_streams};
pub use threshold::{accumulation_threshold, FALLBACK_THRESHOLD};
