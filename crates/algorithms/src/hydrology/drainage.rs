//! Drainage analysis engine
//!
//! Runs the full flow-routing pipeline in one call: D8 flow direction,
//! flow accumulation to a fixed point, threshold derivation and stream
//! network tracing. Stateless: every invocation is independent and fully
//! reproducible for identical input.

use crate::hydrology::flow_accumulation::{flow_accumulation, FlowAccumulationParams};
use crate::hydrology::flow_direction::flow_direction;
use crate::hydrology::stream_network::{stream_mask, trace_streams};
use crate::hydrology::threshold::accumulation_threshold;
use rivulet_core::raster::Raster;
use rivulet_core::vector::StreamNetwork;
use rivulet_core::{Algorithm, Error, Result};
use tracing::debug;

pub use crate::hydrology::flow_accumulation::AccumulationMethod;

/// Parameters for the drainage pipeline
#[derive(Debug, Clone, Default)]
pub struct DrainageParams {
    /// Explicit accumulation threshold; when unset the 50th percentile of
    /// receiving cells is used
    pub min_accumulation: Option<f64>,
    /// Accumulation strategy
    pub method: AccumulationMethod,
}

/// All products of one drainage analysis run.
#[derive(Debug, Clone)]
pub struct DrainageAnalysis {
    /// D8 direction codes, same shape as the DEM
    pub flow_direction: Raster<u8>,
    /// Converged upstream cell counts; NaN where the DEM has no data
    pub flow_accumulation: Raster<f64>,
    /// 1 where accumulation reaches the threshold, 0 elsewhere
    pub stream_mask: Raster<u8>,
    /// Traced stream polylines in geographic coordinates
    pub network: StreamNetwork,
    /// The threshold that was applied
    pub threshold: f64,
}

/// Drainage pipeline as an [`Algorithm`]
#[derive(Debug, Clone, Default)]
pub struct DrainageEngine;

impl Algorithm for DrainageEngine {
    type Input = Raster<f64>;
    type Output = DrainageAnalysis;
    type Params = DrainageParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Drainage Analysis"
    }

    fn description(&self) -> &'static str {
        "Flow direction, accumulation, threshold and stream network from a DEM"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        drainage_analysis(&input, params)
    }
}

/// Run the full drainage pipeline on a DEM.
///
/// No-data elevation cells are excluded throughout: they receive no
/// direction, contribute nothing, and their published accumulation is NaN.
/// Per-cell anomalies (pits, flats, degenerate traces) are normal states,
/// never errors; only a structurally invalid grid fails.
pub fn drainage_analysis(dem: &Raster<f64>, params: DrainageParams) -> Result<DrainageAnalysis> {
    let (rows, cols) = dem.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    debug!(rows, cols, "starting drainage analysis");

    let fdir = flow_direction(dem)?;

    let mut facc = flow_accumulation(
        &fdir,
        FlowAccumulationParams {
            method: params.method,
        },
    )?;

    // Publish no-data cells as NaN so downstream consumers see the same
    // validity mask as the DEM
    for row in 0..rows {
        for col in 0..cols {
            if !dem.is_valid(row, col) {
                facc.set(row, col, f64::NAN)?;
            }
        }
    }

    let threshold = accumulation_threshold(&facc, params.min_accumulation);
    let mask = stream_mask(&facc, threshold)?;
    let network = trace_streams(&mask, &fdir, dem.transform())?;

    debug!(
        lines = network.len(),
        threshold, "drainage analysis finished"
    );

    Ok(DrainageAnalysis {
        flow_direction: fdir,
        flow_accumulation: facc,
        stream_mask: mask,
        network,
        threshold,
    })
}
