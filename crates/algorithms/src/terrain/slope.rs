//! Slope from a DEM
//!
//! Gradient-magnitude slope: central differences in both axes (one-sided
//! at the grid edges), scaled by the cell resolution.

use crate::maybe_rayon::*;
use ndarray::Array2;
use rivulet_core::raster::Raster;
use rivulet_core::{Algorithm, Error, Result};

/// Units for slope output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeUnits {
    /// Radians (0 to π/2)
    #[default]
    Radians,
    /// Degrees (0 to 90)
    Degrees,
    /// Percent rise
    Percent,
}

/// Parameters for slope calculation
#[derive(Debug, Clone)]
pub struct SlopeParams {
    /// Output units
    pub units: SlopeUnits,
    /// Spatial resolution of the DEM (cell size in elevation units)
    pub resolution: f64,
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self {
            units: SlopeUnits::Radians,
            resolution: 1.0,
        }
    }
}

/// Slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Gradient-magnitude slope of a DEM"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        slope(&input, params)
    }
}

/// Calculate slope from a DEM.
///
/// The gradient uses central differences over `2 * resolution` for
/// interior cells and one-sided differences at the edges. Cells whose
/// stencil touches no-data produce NaN.
pub fn slope(dem: &Raster<f64>, params: SlopeParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();

    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }
    if params.resolution <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "resolution",
            value: params.resolution.to_string(),
            reason: "must be positive".into(),
        });
    }

    let res = params.resolution;

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let center = unsafe { dem.get_unchecked(row, col) };
                if dem.is_nodata(center) {
                    continue;
                }

                let Some(grow) = axis_gradient(dem, row, col, rows, true, res) else {
                    continue;
                };
                let Some(gcol) = axis_gradient(dem, row, col, cols, false, res) else {
                    continue;
                };

                let magnitude = (grow * grow + gcol * gcol).sqrt();
                let rad = magnitude.atan();

                row_data[col] = match params.units {
                    SlopeUnits::Radians => rad,
                    SlopeUnits::Degrees => rad.to_degrees(),
                    SlopeUnits::Percent => magnitude * 100.0,
                };
            }
            row_data
        })
        .collect();

    let mut output = dem.with_same_meta::<f64>();
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

/// Gradient along one axis at a cell: central difference inside, one-sided
/// at the first and last index. `None` when the stencil touches no-data.
fn axis_gradient(
    dem: &Raster<f64>,
    row: usize,
    col: usize,
    extent: usize,
    along_rows: bool,
    res: f64,
) -> Option<f64> {
    let idx = if along_rows { row } else { col };

    let value_at = |i: usize| -> Option<f64> {
        let (r, c) = if along_rows { (i, col) } else { (row, i) };
        let v = unsafe { dem.get_unchecked(r, c) };
        (!dem.is_nodata(v)).then_some(v)
    };

    if extent == 1 {
        return Some(0.0);
    }

    if idx == 0 {
        Some((value_at(1)? - value_at(0)?) / res)
    } else if idx + 1 == extent {
        Some((value_at(idx)? - value_at(idx - 1)?) / res)
    } else {
        Some((value_at(idx + 1)? - value_at(idx - 1)?) / (2.0 * res))
    }
}
