//! Affine georeferencing for rasters

use serde::{Deserialize, Serialize};

/// Affine transformation mapping grid indices to geographic coordinates.
///
/// ```text
/// x = origin_x + col * pixel_width  + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up grids the rotation terms are zero and `pixel_height` is
/// negative (row index grows southward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size in the X direction
    pub pixel_width: f64,
    /// Cell size in the Y direction (usually negative)
    pub pixel_height: f64,
    /// Row rotation term (0 for north-up)
    pub row_rotation: f64,
    /// Column rotation term (0 for north-up)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a north-up transform without rotation
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Create from the GDAL coefficient order
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Convert to the GDAL coefficient order
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Geographic coordinates of the center of cell `(row, col)`
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let col_f = col as f64 + 0.5;
        let row_f = row as f64 + 0.5;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Geographic coordinates of the upper-left corner of cell `(row, col)`
    pub fn cell_corner(&self, row: usize, col: usize) -> (f64, f64) {
        let col_f = col as f64;
        let row_f = row as f64;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Fractional grid indices `(row, col)` of a geographic point.
    ///
    /// Returns NaN indices for a degenerate (non-invertible) transform.
    pub fn geo_to_cell(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det.abs() < 1e-12 {
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        (row, col)
    }

    /// Cell size, assuming square cells
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of a grid with the given shape
    pub fn bounds(&self, rows: usize, cols: usize) -> (f64, f64, f64, f64) {
        let corners = [
            self.cell_corner(0, 0),
            self.cell_corner(0, cols),
            self.cell_corner(rows, 0),
            self.cell_corner(rows, cols),
        ];

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        (min_x, min_y, max_x, max_y)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_center_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);

        let (x, y) = gt.cell_center(10, 5);
        let (row, col) = gt.geo_to_cell(x, y);

        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
    }

    #[test]
    fn test_gdal_coefficient_order_roundtrip() {
        let coeffs = [845000.0, 1.0, 0.0, 6520000.0, 0.0, -1.0];
        let gt = GeoTransform::from_gdal(coeffs);
        assert_eq!(gt.to_gdal(), coeffs);
        assert_eq!(gt.cell_size(), 1.0);
    }

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 50.0, 1.0, -1.0);
        let (min_x, min_y, max_x, max_y) = gt.bounds(50, 100);

        assert_relative_eq!(min_x, 0.0);
        assert_relative_eq!(min_y, 0.0);
        assert_relative_eq!(max_x, 100.0);
        assert_relative_eq!(max_y, 50.0);
    }

    #[test]
    fn test_degenerate_transform() {
        let gt = GeoTransform::new(0.0, 0.0, 0.0, 0.0);
        let (row, col) = gt.geo_to_cell(10.0, 10.0);
        assert!(row.is_nan() && col.is_nan());
    }
}
