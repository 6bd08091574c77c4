use crate::direction::Octant;
use crate::grid::Grid;
use signal_common::{SimError, SimResult};

/// Double-buffered grid state for the relaxation.
#[derive(Debug)]
pub struct GridState {
    pub router_row: usize,
    pub router_col: usize,
    pub cell_size: f64,

    // --- Ping-Pong Buffers ---
    // Values being written by the current iteration
    pub current: Grid,
    // Read-only values from the prior iteration
    pub previous: Grid,
}

impl GridState {
    /// Places the router, fixes its signal at `transmit_power_dbm`, and sets the
    /// direction and distance of every other cell.
    pub fn new(
        mut grid: Grid,
        cell_size: f64,
        router_row: usize,
        router_col: usize,
        transmit_power_dbm: f64,
    ) -> SimResult<Self> {
        if !grid.contains(router_row, router_col) {
            return Err(SimError::RouterOutOfBounds {
                row: router_row,
                col: router_col,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }

        grid.cell_mut(router_row, router_col).signal = transmit_power_dbm;

        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                if row == router_row && col == router_col {
                    continue;
                }
                let d_row = router_row.abs_diff(row) as f64;
                let d_col = router_col.abs_diff(col) as f64;
                let cell = grid.cell_mut(row, col);
                cell.direction = Octant::classify(router_row, router_col, row, col);
                cell.distance = cell_size * (d_row * d_row + d_col * d_col).sqrt();
            }
        }

        let previous = grid.clone();
        Ok(Self {
            router_row,
            router_col,
            cell_size,
            current: grid,
            previous,
        })
    }

    #[inline(always)]
    pub fn is_router(&self, row: usize, col: usize) -> bool {
        row == self.router_row && col == self.router_col
    }

    /// Replaces `previous` with a deep copy of `current`.
    pub fn snapshot_previous(&mut self) {
        // clone_from reuses the existing allocation
        self.previous.clone_from(&self.current);
    }
}
