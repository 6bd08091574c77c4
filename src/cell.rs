use crate::direction::Octant;
use signal_common::Walls;
use std::fmt;

/// One grid position: its walls plus the values the relaxation computes for it.
///
/// `Clone` is a full deep copy; the engine relies on it to snapshot the
/// previous iteration without aliasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub walls: Walls,
    /// Direction of this cell as seen from the router. `None` for the router cell.
    pub direction: Option<Octant>,
    /// Euclidean distance to the router, scaled by cell size.
    pub distance: f64,
    /// Accumulated wall attenuation along the path from the router.
    pub rate: u32,
    /// Signal strength (dBm).
    pub signal: f64,
}

impl Cell {
    pub fn new(walls: Walls) -> Self {
        Self {
            walls,
            direction: None,
            distance: 0.0,
            rate: 0,
            signal: 0.0,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(Walls::default())
    }
}

/// `[signal direction rate distance]`, as written to the iteration log.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = self.direction.map_or("--", Octant::as_str);
        write!(
            f,
            "[{:.4} {} {} {:.4}]",
            self.signal, direction, self.rate, self.distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_is_independent_of_original() {
        let mut original = Cell::new(Walls::new('b', 'n', 'g', 'd'));
        original.direction = Some(Octant::NorthEast);
        original.distance = 2.5;
        original.rate = 22;
        original.signal = -90.0;

        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.walls.north = 'w';
        copy.direction = Some(Octant::South);
        copy.distance = 7.0;
        copy.rate = 4;
        copy.signal = 1.0;

        assert_eq!(original.walls.north, 'b');
        assert_eq!(original.direction, Some(Octant::NorthEast));
        assert_eq!(original.distance, 2.5);
        assert_eq!(original.rate, 22);
        assert_eq!(original.signal, -90.0);
    }

    #[test]
    fn display_uses_dashes_for_router() {
        let mut cell = Cell::default();
        cell.signal = 23.0;
        assert_eq!(cell.to_string(), "[23.0000 -- 0 0.0000]");

        cell.direction = Some(Octant::East);
        cell.distance = 1.0;
        cell.rate = 6;
        cell.signal = -89.4294;
        assert_eq!(cell.to_string(), "[-89.4294 E 6 1.0000]");
    }
}
