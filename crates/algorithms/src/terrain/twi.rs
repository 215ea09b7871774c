//! Topographic wetness index
//!
//! `TWI = ln(a / tan(β))` where `a` is the drainage area (upstream cell
//! counts from flow accumulation) and `β` the slope in radians. High
//! values mark areas prone to saturation; the index feeds the downstream
//! infiltration scoring.

use crate::maybe_rayon::*;
use ndarray::Array2;
use rivulet_core::raster::Raster;
use rivulet_core::{Error, Result};

/// Slope floor before the tangent; avoids ln(∞) on flat cells.
const MIN_SLOPE_RAD: f64 = 1e-6;

/// Compute the topographic wetness index.
///
/// # Arguments
/// * `flow_acc` - Flow accumulation (upstream cell counts, ≥ 1)
/// * `slope_rad` - Slope in radians, same shape
///
/// Cells where either input is no-data produce NaN. Zero slope is clamped
/// to a small epsilon before the tangent, never propagated as infinity.
pub fn wetness_index(flow_acc: &Raster<f64>, slope_rad: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = flow_acc.shape();
    let (srows, scols) = slope_rad.shape();

    if (rows, cols) != (srows, scols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: srows,
            ac: scols,
        });
    }
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let acc = unsafe { flow_acc.get_unchecked(row, col) };
                let slp = unsafe { slope_rad.get_unchecked(row, col) };

                if flow_acc.is_nodata(acc) || slope_rad.is_nodata(slp) {
                    continue;
                }

                let beta = slp.max(MIN_SLOPE_RAD);
                row_data[col] = (acc / beta.tan()).ln();
            }
            row_data
        })
        .collect();

    let mut output = flow_acc.with_same_meta::<f64>();
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_value() {
        let acc = Raster::filled(3, 3, 10.0_f64);
        let slp = Raster::filled(3, 3, 0.1_f64);

        let result = wetness_index(&acc, &slp).unwrap();
        let expected = (10.0 / 0.1_f64.tan()).ln();
        assert_relative_eq!(result.get(1, 1).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_cell_clamped_not_infinite() {
        let acc = Raster::filled(2, 2, 5.0_f64);
        let slp = Raster::filled(2, 2, 0.0_f64);

        let result = wetness_index(&acc, &slp).unwrap();
        let v = result.get(0, 0).unwrap();
        assert!(v.is_finite());
        assert_relative_eq!(v, (5.0 / MIN_SLOPE_RAD.tan()).ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_wet_cells_score_higher() {
        let mut acc = Raster::filled(2, 2, 1.0_f64);
        acc.set(0, 0, 500.0).unwrap();
        let slp = Raster::filled(2, 2, 0.05_f64);

        let result = wetness_index(&acc, &slp).unwrap();
        assert!(result.get(0, 0).unwrap() > result.get(1, 1).unwrap());
    }

    #[test]
    fn test_nodata_propagates() {
        let mut acc = Raster::filled(2, 2, 10.0_f64);
        acc.set(0, 1, f64::NAN).unwrap();
        let slp = Raster::filled(2, 2, 0.1_f64);

        let result = wetness_index(&acc, &slp).unwrap();
        assert!(result.get(0, 1).unwrap().is_nan());
        assert!(!result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        let acc: Raster<f64> = Raster::new(3, 3);
        let slp: Raster<f64> = Raster::new(2, 3);
        assert!(wetness_index(&acc, &slp).is_err());
    }
}
