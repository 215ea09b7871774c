//! D8 flow direction assignment
//!
//! Routes each cell's outflow to its steepest downslope neighbor using the
//! single-flow-direction (D8) method. Output cells hold the bit-flag codes
//! from [`rivulet_core::raster::d8`]; `0` marks cells without outflow.
//!
//! Boundary-ring cells never receive a direction: a cell on the grid edge
//! has an incomplete neighborhood, so its steepest neighbor cannot be
//! determined reliably.

use crate::maybe_rayon::*;
use ndarray::Array2;
use rivulet_core::raster::d8::{Direction, NONE};
use rivulet_core::raster::Raster;
use rivulet_core::{Algorithm, Error, Result};

/// Flow direction algorithm (D8)
#[derive(Debug, Clone, Default)]
pub struct FlowDirection;

impl Algorithm for FlowDirection {
    type Input = Raster<f64>;
    type Output = Raster<u8>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Direction (D8)"
    }

    fn description(&self) -> &'static str {
        "Assign each cell's outflow to its steepest downslope neighbor"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        flow_direction(&input)
    }
}

/// Calculate D8 flow direction from a DEM.
///
/// For every interior cell with valid elevation, the descent rate to each
/// valid neighbor is `(z_cell - z_neighbor) / distance` with distance 1 for
/// orthogonal and √2 for diagonal neighbors. The neighbor with the strictly
/// greatest positive rate wins; ties keep the first neighbor in the fixed
/// enumeration order E, SE, S, SW, W, NW, N, NE. Cells with no positive
/// descent (pits, flats), no-data cells and the boundary ring get `0`.
///
/// A non-zero output cell therefore always points at an in-bounds neighbor
/// with valid elevation.
pub fn flow_direction(dem: &Raster<f64>) -> Result<Raster<u8>> {
    let (rows, cols) = dem.shape();

    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let output_data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![NONE; cols];

            if row == 0 || row + 1 == rows {
                return row_data;
            }

            for col in 1..cols.saturating_sub(1) {
                let center = unsafe { dem.get_unchecked(row, col) };
                if dem.is_nodata(center) {
                    continue;
                }

                let mut best_rate = 0.0_f64;
                let mut best_dir = NONE;

                for dir in Direction::ALL {
                    let Some((nr, nc)) = dir.neighbor(row, col, rows, cols) else {
                        continue;
                    };

                    let neighbor = unsafe { dem.get_unchecked(nr, nc) };
                    if dem.is_nodata(neighbor) {
                        continue;
                    }

                    // Strictly greater keeps the first of tied neighbors
                    let rate = (center - neighbor) / dir.distance();
                    if rate > best_rate {
                        best_rate = rate;
                        best_dir = dir.code();
                    }
                }

                row_data[col] = best_dir;
            }

            row_data
        })
        .collect();

    let mut output = dem.with_same_meta::<u8>();
    output.set_nodata(Some(NONE));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}
