//! Drainage threshold selection
//!
//! Derives the accumulation cutoff separating channel from non-channel
//! cells. A percentile of the observed accumulation distribution
//! self-calibrates to the terrain instead of relying on a hardcoded
//! constant.

use rivulet_core::raster::Raster;
use tracing::debug;

/// Fallback threshold for degenerate accumulation fields where no cell
/// receives upstream flow.
pub const FALLBACK_THRESHOLD: f64 = 10.0;

/// Derive the drainage-area threshold from a flow accumulation raster.
///
/// An explicit `min_accumulation` override is returned unchanged.
/// Otherwise the threshold is the 50th percentile of valid cells with
/// accumulation strictly greater than 1 (cells that actually receive
/// upstream flow); if no cell qualifies, [`FALLBACK_THRESHOLD`].
pub fn accumulation_threshold(flow_acc: &Raster<f64>, min_accumulation: Option<f64>) -> f64 {
    if let Some(explicit) = min_accumulation {
        return explicit;
    }

    let mut receiving: Vec<f64> = flow_acc
        .data()
        .iter()
        .copied()
        .filter(|&v| !flow_acc.is_nodata(v) && v > 1.0)
        .collect();

    let threshold = if receiving.is_empty() {
        FALLBACK_THRESHOLD
    } else {
        receiving.sort_unstable_by(|a, b| a.total_cmp(b));
        percentile_sorted(&receiving, 50.0)
    };

    debug!(threshold, "using flow accumulation threshold");
    threshold
}

/// Percentile of an ascending slice with linear interpolation between
/// order statistics.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=100.0).contains(&p));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn acc_raster(values: Vec<f64>) -> Raster<f64> {
        let cells = values.len();
        Raster::from_vec(values, 1, cells).unwrap()
    }

    #[test]
    fn test_explicit_override_wins() {
        let acc = acc_raster(vec![1.0, 50.0, 100.0]);
        assert_eq!(accumulation_threshold(&acc, Some(42.0)), 42.0);
    }

    #[test]
    fn test_fallback_when_nothing_receives_flow() {
        let acc = acc_raster(vec![1.0; 16]);
        assert_eq!(accumulation_threshold(&acc, None), FALLBACK_THRESHOLD);
    }

    #[test]
    fn test_median_of_receiving_cells() {
        // Receiving cells: 2, 4, 6 -> median 4; the 1.0 cells are excluded
        let acc = acc_raster(vec![1.0, 2.0, 1.0, 4.0, 6.0, 1.0]);
        assert_relative_eq!(accumulation_threshold(&acc, None), 4.0);
    }

    #[test]
    fn test_median_interpolates_between_order_statistics() {
        // Receiving cells: 2, 3, 4, 5 -> median 3.5
        let acc = acc_raster(vec![2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(accumulation_threshold(&acc, None), 3.5);
    }

    #[test]
    fn test_nan_cells_ignored() {
        let acc = acc_raster(vec![f64::NAN, 2.0, f64::NAN, 8.0]);
        assert_relative_eq!(accumulation_threshold(&acc, None), 5.0);
    }

    #[test]
    fn test_percentile_endpoints() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(percentile_sorted(&sorted, 100.0), 4.0);
        assert_relative_eq!(percentile_sorted(&sorted, 25.0), 1.75);
    }
}
