use crate::grid::{Grid, GridSpec};
use crate::grid_state::GridState;
use crate::output::IterationLog;
use crate::propagation::{atten_rate, fspl};
use crate::report::{find_weakest, WeakestCells};
use log::{debug, info, trace, warn};
use signal_common::{SimError, SimParams, SimResult, Snapshot};
use std::collections::BTreeSet;
use std::time::Instant;

/// Outcome of a converged run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Iterations executed, including the final one that confirmed convergence.
    pub iterations: u32,
    /// Largest signal change in the final iteration.
    pub max_delta: f64,
}

/// Manages the state and execution of the signal relaxation.
pub struct SignalSimulation {
    /// Engine parameters, fixed for the whole run.
    params: SimParams,
    /// Double-buffered grid.
    pub state: GridState,
    /// Number of completed iterations.
    iteration: u32,
    last_max_delta: f64,
    record_snapshots: bool,
    /// Stores a snapshot of every iteration when recording is enabled.
    recorded_snapshots: Vec<Snapshot>,
}

impl SignalSimulation {
    /// Validates the grid and places the router.
    ///
    /// Fails on inconsistent shared walls, on unknown wall materials in strict
    /// mode, and on a router outside the grid.
    pub fn new(spec: GridSpec, router_row: usize, router_col: usize, params: SimParams) -> SimResult<Self> {
        let GridSpec { cell_size, grid } = spec;

        grid.validate()?;
        check_materials(&grid, &params)?;

        let state = GridState::new(grid, cell_size, router_row, router_col, params.transmit_power_dbm)?;
        debug!(
            "Router placed at ({}, {}) on a {}x{} grid, cell size {}.",
            router_row,
            router_col,
            state.current.rows(),
            state.current.cols(),
            cell_size
        );

        Ok(Self {
            params,
            state,
            iteration: 0,
            last_max_delta: f64::INFINITY,
            record_snapshots: false,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Keep a [`Snapshot`] of every iteration for later export.
    pub fn with_snapshots(mut self, enabled: bool) -> Self {
        self.record_snapshots = enabled;
        self
    }

    /// Runs one relaxation iteration and returns the largest absolute signal change.
    ///
    /// The grid computed by the last step becomes `previous`; every non-router
    /// cell in `current` is then recomputed from `previous` alone.
    pub fn step(&mut self) -> f64 {
        self.state.snapshot_previous();

        let transmit = self.params.transmit_power_dbm;
        let frequency = self.params.frequency_ghz;
        let table = &self.params.attenuation;
        let (router_row, router_col) = (self.state.router_row, self.state.router_col);
        let GridState { current, previous, .. } = &mut self.state;

        let mut max_delta: f64 = 0.0;
        for row in 0..previous.rows() {
            for col in 0..previous.cols() {
                if row == router_row && col == router_col {
                    continue;
                }
                let rate = atten_rate(previous, row, col, table);
                let old = previous.cell(row, col);
                let signal = transmit - fspl(old.distance, frequency) - rate as f64;

                let delta = (signal - old.signal).abs();
                if delta.is_nan() || delta > max_delta {
                    max_delta = delta;
                }

                let cell = current.cell_mut(row, col);
                cell.rate = rate;
                cell.signal = signal;
                trace!("cell ({}, {}): rate {} signal {:.4}", row, col, rate, signal);
            }
        }

        self.iteration += 1;
        self.last_max_delta = max_delta;
        max_delta
    }

    /// Iterates until every signal changes by less than `epsilon`, appending each
    /// iteration to `log`.
    ///
    /// Returns [`SimError::NotConverged`] once `max_iterations` steps have run
    /// without settling.
    pub fn run<L: IterationLog + ?Sized>(&mut self, log: &mut L) -> SimResult<RunSummary> {
        info!(
            "Relaxing {} cells (epsilon {}, at most {} iterations)...",
            self.state.current.len(),
            self.params.epsilon,
            self.params.max_iterations
        );
        let start_time = Instant::now();

        loop {
            if self.iteration >= self.params.max_iterations {
                return Err(SimError::NotConverged {
                    iterations: self.iteration,
                    max_delta: self.last_max_delta,
                });
            }

            let step_start_time = Instant::now();
            let max_delta = self.step();
            debug!(
                "Iteration {} | max delta {:.6} dB | {:.3} ms",
                self.iteration,
                max_delta,
                step_start_time.elapsed().as_secs_f64() * 1000.0
            );

            log.record(self.iteration, &self.state.current)?;
            if self.record_snapshots {
                self.record_snapshot();
            }

            if max_delta < self.params.epsilon {
                info!(
                    "Converged after {} iterations in {:.3} ms.",
                    self.iteration,
                    start_time.elapsed().as_secs_f64() * 1000.0
                );
                return Ok(RunSummary {
                    iterations: self.iteration,
                    max_delta,
                });
            }
        }
    }

    /// Weakest cell(s) of the current grid.
    pub fn weakest_cells(&self) -> WeakestCells {
        find_weakest(&self.state.current)
    }

    pub fn grid(&self) -> &Grid {
        &self.state.current
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Records the current grid as a snapshot.
    pub fn record_snapshot(&mut self) {
        let grid = &self.state.current;
        self.recorded_snapshots.push(Snapshot {
            iteration: self.iteration,
            rows: grid.rows(),
            cols: grid.cols(),
            router_row: self.state.router_row,
            router_col: self.state.router_col,
            max_delta: self.last_max_delta,
            signals: grid.cells().iter().map(|c| c.signal).collect(),
            rates: grid.cells().iter().map(|c| c.rate).collect(),
        });
    }

    /// Provides access to the recorded snapshots.
    pub fn get_recorded_snapshots(&self) -> &Vec<Snapshot> {
        &self.recorded_snapshots
    }
}

/// Reports wall codes missing from the attenuation table. Strict mode rejects the
/// grid at the first one; otherwise each distinct code is warned about once.
fn check_materials(grid: &Grid, params: &SimParams) -> SimResult<()> {
    let mut reported = BTreeSet::new();
    for (row, col, cell) in grid.iter() {
        for (_, code) in cell.walls.iter() {
            if params.attenuation.contains(code) {
                continue;
            }
            if params.strict_materials {
                return Err(SimError::UnknownMaterial { code, row, col });
            }
            if reported.insert(code) {
                warn!(
                    "Invalid wall type '{}' first seen in cell ({}, {}); it will add no attenuation.",
                    code, row, col
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullLog;
    use signal_common::{AttenuationTable, Walls};
    use std::collections::BTreeMap;

    fn spec(rows: usize, cols: usize, walls: Vec<Walls>) -> GridSpec {
        GridSpec {
            cell_size: 1.0,
            grid: Grid::from_walls(rows, cols, walls),
        }
    }

    #[test]
    fn unknown_material_rejected_in_strict_mode() {
        let walls = vec![Walls::new('n', 'x', 'n', 'n'), Walls::new('n', 'n', 'n', 'x')];
        let params = SimParams {
            strict_materials: true,
            ..SimParams::default()
        };
        let err = SignalSimulation::new(spec(1, 2, walls), 0, 0, params).err().unwrap();
        assert!(matches!(err, SimError::UnknownMaterial { code: 'x', row: 0, col: 0 }));
    }

    #[test]
    fn unknown_material_is_reported_and_run_continues() {
        let walls = vec![Walls::new('n', 'x', 'n', 'n'), Walls::new('n', 'n', 'n', 'x')];
        let mut sim = SignalSimulation::new(spec(1, 2, walls), 0, 0, SimParams::default()).unwrap();
        let summary = sim.run(&mut NullLog).unwrap();
        assert_eq!(summary.iterations, 2);
        assert_eq!(sim.grid().cell(0, 1).rate, 0);
    }

    #[test]
    fn huge_attenuation_saturates_instead_of_overflowing() {
        let overrides: BTreeMap<char, u32> = [('m', 3_000_000_000)].into_iter().collect();
        let params = SimParams {
            attenuation: AttenuationTable::with_overrides(&overrides),
            max_iterations: 5,
            ..SimParams::default()
        };
        let walls = vec![
            Walls::new('n', 'm', 'n', 'n'),
            Walls::new('n', 'm', 'n', 'm'),
            Walls::new('n', 'n', 'n', 'm'),
        ];
        let mut sim = SignalSimulation::new(spec(1, 3, walls), 0, 0, params).unwrap();
        sim.run(&mut NullLog).unwrap();
        assert_eq!(sim.grid().cell(0, 1).rate, 3_000_000_000);
        assert_eq!(sim.grid().cell(0, 2).rate, u32::MAX);
    }

    #[test]
    fn mismatched_walls_stop_before_setup() {
        let walls = vec![Walls::new('n', 'b', 'n', 'n'), Walls::new('n', 'n', 'n', 'g')];
        let err = SignalSimulation::new(spec(1, 2, walls), 0, 0, SimParams::default())
            .err()
            .unwrap();
        assert!(matches!(err, SimError::WallMismatch { .. }));
    }

    #[test]
    fn router_signal_is_never_recomputed() {
        let mut sim = SignalSimulation::new(spec(2, 2, vec![Walls::default(); 4]), 1, 1, SimParams::default()).unwrap();
        for _ in 0..3 {
            sim.step();
            assert_eq!(sim.grid().cell(1, 1).signal, 23.0);
            assert_eq!(sim.grid().cell(1, 1).rate, 0);
        }
    }

    #[test]
    fn snapshots_follow_iterations() {
        let sim = SignalSimulation::new(spec(1, 3, vec![Walls::default(); 3]), 0, 1, SimParams::default()).unwrap();
        let mut sim = sim.with_snapshots(true);
        let summary = sim.run(&mut NullLog).unwrap();
        let snapshots = sim.get_recorded_snapshots();
        assert_eq!(snapshots.len(), summary.iterations as usize);
        let last = snapshots.last().unwrap();
        assert_eq!(last.iteration, summary.iterations);
        assert_eq!((last.rows, last.cols), (1, 3));
        assert_eq!((last.router_row, last.router_col), (0, 1));
        assert_eq!(last.signals[1], 23.0);
    }
}
