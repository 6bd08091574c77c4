//! Path-loss and wall-attenuation rules applied to each cell.

use crate::grid::Grid;
use signal_common::AttenuationTable;

/// Constant term of the free-space path loss formula (dB).
pub const FSPL_CONSTANT_DB: f64 = 92.45;

/// Free-space path loss in dB. `distance` must be positive.
#[inline]
pub fn fspl(distance: f64, frequency: f64) -> f64 {
    20.0 * distance.log10() + 20.0 * frequency.log10() + FSPL_CONSTANT_DB
}

/// Attenuation rate of cell (`row`, `col`) from the previous iteration's grid.
///
/// Each upstream neighbour contributes its own previous rate plus the
/// attenuation of the wall crossed to reach it; the worst (highest) candidate
/// wins. Unknown wall codes contribute nothing. Rates saturate at `u32::MAX`.
/// The router cell has no direction and gets 0.
pub fn atten_rate(previous: &Grid, row: usize, col: usize, table: &AttenuationTable) -> u32 {
    let cell = previous.cell(row, col);
    let Some(octant) = cell.direction else {
        return 0;
    };

    octant
        .upstream_paths()
        .iter()
        .filter_map(|path| {
            let (n_row, n_col) = previous.neighbor(row, col, path.d_row, path.d_col)?;
            let wall = table.attenuation(cell.walls.get(path.wall)).unwrap_or(0);
            Some(previous.cell(n_row, n_col).rate.saturating_add(wall))
        })
        .max()
        .unwrap_or(0)
}
