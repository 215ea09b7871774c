//! D8 flow topology: the 8-connected neighborhood shared by all
//! routing stages.
//!
//! Directions are encoded as bit flags in a `u8` raster:
//!
//! ```text
//!   32  64  128
//!   16   .    1
//!    8   4    2
//! ```
//!
//! `0` means no outflow (boundary, no-data, pit or flat). The enumeration
//! order `E, SE, S, SW, W, NW, N, NE` is fixed: tie-breaking in flow
//! direction assignment depends on it.

use std::f64::consts::SQRT_2;

/// Direction code for cells without a downslope neighbor.
pub const NONE: u8 = 0;

/// One of the eight D8 compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    East = 1,
    SouthEast = 2,
    South = 4,
    SouthWest = 8,
    West = 16,
    NorthWest = 32,
    North = 64,
    NorthEast = 128,
}

impl Direction {
    /// All directions in the fixed enumeration order.
    pub const ALL: [Direction; 8] = [
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
    ];

    /// Bit-flag code stored in flow direction rasters.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raster value; `0` and unknown codes map to `None`.
    pub fn from_code(code: u8) -> Option<Direction> {
        match code {
            1 => Some(Direction::East),
            2 => Some(Direction::SouthEast),
            4 => Some(Direction::South),
            8 => Some(Direction::SouthWest),
            16 => Some(Direction::West),
            32 => Some(Direction::NorthWest),
            64 => Some(Direction::North),
            128 => Some(Direction::NorthEast),
            _ => None,
        }
    }

    /// `(Δrow, Δcol)` offset of the neighbor this direction points to.
    /// Row index grows southward.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
        }
    }

    /// Distance to the neighbor in cell units: 1 orthogonal, √2 diagonal.
    pub fn distance(self) -> f64 {
        let (dr, dc) = self.offset();
        if dr != 0 && dc != 0 {
            SQRT_2
        } else {
            1.0
        }
    }

    /// The direction pointing back at this one.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
        }
    }

    /// Resolve the neighbor of `(row, col)` in this direction, or `None`
    /// when it falls outside a `rows x cols` grid.
    pub fn neighbor(
        self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Option<(usize, usize)> {
        let (dr, dc) = self.offset();
        let nr = row as isize + dr;
        let nc = col as isize + dc;

        if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
            None
        } else {
            Some((nr as usize, nc as usize))
        }
    }
}
