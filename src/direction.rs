use serde::{Deserialize, Serialize};
use signal_common::WallSide;
use std::cmp::Ordering;
use std::fmt;

/// Compass octant of a cell relative to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Octant {
    North,
    East,
    South,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

/// One way a signal can reach a cell: from the neighbour at
/// (`d_row`, `d_col`) through this cell's `wall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamPath {
    pub d_row: isize,
    pub d_col: isize,
    pub wall: WallSide,
}

impl UpstreamPath {
    const fn new(d_row: isize, d_col: isize, wall: WallSide) -> Self {
        Self { d_row, d_col, wall }
    }
}

const FROM_NORTH: UpstreamPath = UpstreamPath::new(-1, 0, WallSide::North);
const FROM_EAST: UpstreamPath = UpstreamPath::new(0, 1, WallSide::East);
const FROM_SOUTH: UpstreamPath = UpstreamPath::new(1, 0, WallSide::South);
const FROM_WEST: UpstreamPath = UpstreamPath::new(0, -1, WallSide::West);

impl Octant {
    pub const ALL: [Octant; 8] = [
        Octant::North,
        Octant::East,
        Octant::South,
        Octant::West,
        Octant::NorthEast,
        Octant::NorthWest,
        Octant::SouthEast,
        Octant::SouthWest,
    ];

    /// Classifies cell (`row`, `col`) against the router at
    /// (`router_row`, `router_col`). Returns `None` only for the router cell.
    pub fn classify(router_row: usize, router_col: usize, row: usize, col: usize) -> Option<Octant> {
        let d_row = router_row.abs_diff(row);
        let d_col = router_col.abs_diff(col);

        match d_row.cmp(&d_col) {
            Ordering::Greater => match router_row.cmp(&row) {
                Ordering::Greater => Some(Octant::North),
                Ordering::Less => Some(Octant::South),
                Ordering::Equal => None,
            },
            Ordering::Less => match router_col.cmp(&col) {
                Ordering::Greater => Some(Octant::West),
                Ordering::Less => Some(Octant::East),
                Ordering::Equal => None,
            },
            Ordering::Equal => match (router_row.cmp(&row), router_col.cmp(&col)) {
                (Ordering::Greater, Ordering::Greater) => Some(Octant::NorthWest),
                (Ordering::Greater, Ordering::Less) => Some(Octant::NorthEast),
                (Ordering::Less, Ordering::Greater) => Some(Octant::SouthWest),
                (Ordering::Less, Ordering::Less) => Some(Octant::SouthEast),
                _ => None,
            },
        }
    }

    /// Neighbours lying between a cell in this octant and the router:
    /// one for cardinal directions, two for diagonals.
    pub fn upstream_paths(self) -> &'static [UpstreamPath] {
        match self {
            Octant::North => &[FROM_SOUTH],
            Octant::South => &[FROM_NORTH],
            Octant::West => &[FROM_EAST],
            Octant::East => &[FROM_WEST],
            Octant::NorthWest => &[FROM_EAST, FROM_SOUTH],
            Octant::NorthEast => &[FROM_WEST, FROM_SOUTH],
            Octant::SouthWest => &[FROM_NORTH, FROM_EAST],
            Octant::SouthEast => &[FROM_NORTH, FROM_WEST],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Octant::North => "N",
            Octant::East => "E",
            Octant::South => "S",
            Octant::West => "W",
            Octant::NorthEast => "NE",
            Octant::NorthWest => "NW",
            Octant::SouthEast => "SE",
            Octant::SouthWest => "SW",
        }
    }
}

impl fmt::Display for Octant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
