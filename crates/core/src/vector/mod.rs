//! Vector products of the drainage analysis.
//!
//! Stream networks are ordered sets of polylines in geographic coordinates,
//! built on `geo_types::LineString` so they can be handed to any vector
//! export or visualization layer.

use geo_types::{Coord, LineString};

/// A single traced stream polyline with derived attributes.
#[derive(Debug, Clone)]
pub struct StreamLine {
    /// Sequential identifier, assigned in trace order
    pub id: usize,
    /// Polyline geometry in geographic coordinates
    pub geometry: LineString<f64>,
    /// Number of grid cells the trace visited
    pub cells: usize,
    /// Euclidean length in coordinate units
    pub length: f64,
}

impl StreamLine {
    /// Build a stream line from traced coordinates.
    ///
    /// Returns `None` for degenerate traces (fewer than 2 coordinates),
    /// which cannot form a line.
    pub fn from_coords(id: usize, coords: Vec<(f64, f64)>) -> Option<Self> {
        if coords.len() < 2 {
            return None;
        }

        let length = coords
            .windows(2)
            .map(|w| {
                let (x0, y0) = w[0];
                let (x1, y1) = w[1];
                ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
            })
            .sum();

        let cells = coords.len();
        let geometry = LineString::from(
            coords
                .into_iter()
                .map(|(x, y)| Coord { x, y })
                .collect::<Vec<_>>(),
        );

        Some(Self {
            id,
            geometry,
            cells,
            length,
        })
    }

    /// Number of coordinates in the polyline
    pub fn num_coords(&self) -> usize {
        self.geometry.0.len()
    }

    /// Last coordinate of the polyline (the downstream end)
    pub fn downstream_end(&self) -> (f64, f64) {
        // from_coords guarantees at least 2 coordinates
        let c = self.geometry.0[self.geometry.0.len() - 1];
        (c.x, c.y)
    }
}

/// An ordered collection of traced stream lines.
#[derive(Debug, Clone, Default)]
pub struct StreamNetwork {
    pub lines: Vec<StreamLine>,
}

impl StreamNetwork {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn push(&mut self, line: StreamLine) {
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamLine> {
        self.lines.iter()
    }

    /// Total euclidean length of all lines
    pub fn total_length(&self) -> f64 {
        self.lines.iter().map(|l| l.length).sum()
    }

    /// Total number of cells claimed by all traces
    pub fn total_cells(&self) -> usize {
        self.lines.iter().map(|l| l.cells).sum()
    }
}

impl IntoIterator for StreamNetwork {
    type Item = StreamLine;
    type IntoIter = std::vec::IntoIter<StreamLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}
