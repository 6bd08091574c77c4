use crate::grid::Grid;
use std::fmt;

/// The minimum signal of a grid and every cell that reaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct WeakestCells {
    pub min_signal: f64,
    /// `(row, col)` in row-major order.
    pub cells: Vec<(usize, usize)>,
}

/// Scans `grid` for its minimum signal and collects all cells at or below it.
pub fn find_weakest(grid: &Grid) -> WeakestCells {
    let min_signal = grid
        .cells()
        .iter()
        .map(|cell| cell.signal)
        .fold(f64::INFINITY, f64::min);

    let cells = grid
        .iter()
        .filter(|(_, _, cell)| cell.signal <= min_signal)
        .map(|(row, col, _)| (row, col))
        .collect();

    WeakestCells { min_signal, cells }
}

/// Console report: the minimum followed by one `(row, col)` line per cell.
impl fmt::Display for WeakestCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "minimum signal strength: {} occurs in these cells: ", self.min_signal)?;
        for (row, col) in &self.cells {
            writeln!(f, "({}, {})", row, col)?;
        }
        Ok(())
    }
}
