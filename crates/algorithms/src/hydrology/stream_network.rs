//! Stream network extraction
//!
//! Thresholds the accumulation field into a binary stream mask, then walks
//! connected chains of masked cells along their flow directions into
//! polylines in geographic coordinates.
//!
//! Cells are claimed by the first trace that visits them, so the network
//! partitions the mask into maximal non-branching downstream chains. At a
//! confluence the branch whose row-major scan arrives first keeps going and
//! the other branch's trace terminates there.

use ndarray::Array2;
use rivulet_core::raster::d8::Direction;
use rivulet_core::raster::Raster;
use rivulet_core::vector::{StreamLine, StreamNetwork};
use rivulet_core::{Error, GeoTransform, Result};
use tracing::trace;

/// Build the binary stream mask: 1 where accumulation is valid and at or
/// above the threshold, 0 elsewhere.
pub fn stream_mask(flow_acc: &Raster<f64>, threshold: f64) -> Result<Raster<u8>> {
    let (rows, cols) = flow_acc.shape();

    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let mut mask_data = Array2::<u8>::zeros((rows, cols));
    for row in 0..rows {
        for col in 0..cols {
            let acc = unsafe { flow_acc.get_unchecked(row, col) };
            if !flow_acc.is_nodata(acc) && acc >= threshold {
                mask_data[(row, col)] = 1;
            }
        }
    }

    let mut output = flow_acc.with_same_meta::<u8>();
    output.set_nodata(Some(0));
    *output.data_mut() = mask_data;

    Ok(output)
}

/// Trace all stream lines out of a mask.
///
/// Scans in row-major order; every masked, unclaimed cell starts a forward
/// walk along flow directions. The walk claims each visited cell, converts
/// its indices to the geographic cell center, and stops at the first cell
/// that is out of the mask, already claimed, or has no direction. Walks
/// that produce fewer than 2 coordinates cannot form a line and are
/// dropped.
pub fn trace_streams(
    mask: &Raster<u8>,
    flow_dir: &Raster<u8>,
    transform: &GeoTransform,
) -> Result<StreamNetwork> {
    let (rows, cols) = mask.shape();

    if flow_dir.shape() != (rows, cols) {
        let (ar, ac) = flow_dir.shape();
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar,
            ac,
        });
    }

    let mut visited = Array2::<bool>::from_elem((rows, cols), false);
    let mut network = StreamNetwork::new();

    for row in 0..rows {
        for col in 0..cols {
            let masked = unsafe { mask.get_unchecked(row, col) } == 1;
            if !masked || visited[(row, col)] {
                continue;
            }

            let coords = trace_single(row, col, mask, flow_dir, transform, &mut visited);

            match StreamLine::from_coords(network.len(), coords) {
                Some(line) => network.push(line),
                None => trace!(row, col, "dropping degenerate single-cell trace"),
            }
        }
    }

    Ok(network)
}

/// Walk one chain starting at `(row, col)`, claiming cells as it goes.
fn trace_single(
    start_row: usize,
    start_col: usize,
    mask: &Raster<u8>,
    flow_dir: &Raster<u8>,
    transform: &GeoTransform,
    visited: &mut Array2<bool>,
) -> Vec<(f64, f64)> {
    let (rows, cols) = mask.shape();
    let mut coords = Vec::new();
    let mut row = start_row;
    let mut col = start_col;

    loop {
        let masked = unsafe { mask.get_unchecked(row, col) } == 1;
        if !masked || visited[(row, col)] {
            break;
        }

        visited[(row, col)] = true;
        coords.push(transform.cell_center(row, col));

        let code = unsafe { flow_dir.get_unchecked(row, col) };
        let Some(dir) = Direction::from_code(code) else {
            break;
        };
        let Some((nr, nc)) = dir.neighbor(row, col, rows, cols) else {
            break;
        };

        row = nr;
        col = nc;
    }

    coords
}
