// tests/relaxation.rs
//
// End-to-end checks of the relaxation engine on small hand-computed grids.
// Run with: cargo test --test relaxation

use signal_common::{SimError, SimParams};
use signal_engine::output::{NullLog, TextLog};
use signal_engine::{GridSpec, Octant, SignalSimulation};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn simulation(text: &str, router_row: usize, router_col: usize, params: SimParams) -> SignalSimulation {
    let spec = GridSpec::parse(text).expect("grid parses");
    SignalSimulation::new(spec, router_row, router_col, params).expect("simulation sets up")
}

#[test]
fn one_by_two_open_grid() {
    let mut sim = simulation("1.0 1 2\nnnnn nnnn\n", 0, 0, SimParams::default());
    let summary = sim.run(&mut NullLog).unwrap();

    // First iteration computes the values, second confirms nothing moved
    assert_eq!(summary.iterations, 2);
    assert!(summary.max_delta < 1e-4);

    let cell = sim.grid().cell(0, 1);
    assert_eq!(cell.direction, Some(Octant::East));
    assert_eq!(cell.distance, 1.0);
    assert_eq!(cell.rate, 0);
    assert!(approx_eq(cell.signal, -83.4294, 1e-4), "signal {}", cell.signal);

    let weakest = sim.weakest_cells();
    assert_eq!(weakest.cells, vec![(0, 1)]);
    assert_eq!(weakest.min_signal, cell.signal);
}

#[test]
fn brick_walls_accumulate_along_a_corridor() {
    // Router at the west end, brick between every pair of cells
    let text = "1.0 1 3\nnbnn nbnb nnnb\n";

    let mut sim = simulation(text, 0, 0, SimParams::default());
    let summary = sim.run(&mut NullLog).unwrap();
    assert_eq!(summary.iterations, 3);

    let grid = sim.grid();
    assert_eq!(grid.cell(0, 1).rate, 22);
    assert_eq!(grid.cell(0, 2).rate, 44);
    assert!(approx_eq(grid.cell(0, 1).signal, 23.0 - 106.4294 - 22.0, 1e-4));
    // fspl(2, 5) is exactly 112.45
    assert!(approx_eq(grid.cell(0, 2).signal, -133.45, 1e-9));

    let weakest = sim.weakest_cells();
    assert_eq!(weakest.cells, vec![(0, 2)]);
}

#[test]
fn iteration_cap_reports_non_convergence() {
    let params = SimParams {
        max_iterations: 2,
        ..SimParams::default()
    };
    let mut sim = simulation("1.0 1 3\nnbnn nbnb nnnb\n", 0, 0, params);
    let err = sim.run(&mut NullLog).unwrap_err();
    match err {
        SimError::NotConverged { iterations, max_delta } => {
            assert_eq!(iterations, 2);
            assert!(approx_eq(max_delta, 22.0, 1e-9));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn diagonal_cell_takes_worst_path() {
    // Router at (0,0). Cell (1,1) is SE: through brick from the north, drywall from the west.
    let text = "1.0 2 2\n\
                nnnn nnbn\n\
                ndnn bnnd\n";
    let mut sim = simulation(text, 0, 0, SimParams::default());
    sim.run(&mut NullLog).unwrap();

    let grid = sim.grid();
    assert_eq!(grid.cell(1, 1).direction, Some(Octant::SouthEast));
    assert_eq!(grid.cell(1, 1).rate, 22);
    assert_eq!(grid.cell(0, 1).rate, 0);
    assert_eq!(grid.cell(1, 0).rate, 0);
}

#[test]
fn fixed_point_is_stable() {
    let text = "2.0 3 3\n\
                nbgn ncwb nnwc\n\
                gdnn wnnd wnnn\n\
                nnnn nnnn nnnn\n";
    let mut sim = simulation(text, 1, 1, SimParams::default());
    sim.run(&mut NullLog).unwrap();

    let before: Vec<f64> = sim.grid().cells().iter().map(|c| c.signal).collect();
    let delta = sim.step();
    assert!(delta < sim.params().epsilon);
    for (old, cell) in before.iter().zip(sim.grid().cells()) {
        assert!((old - cell.signal).abs() < sim.params().epsilon);
    }
}

#[test]
fn symmetric_ties_are_all_reported() {
    let mut sim = simulation("1.0 1 3\nnnnn nnnn nnnn\n", 0, 1, SimParams::default());
    sim.run(&mut NullLog).unwrap();

    let weakest = sim.weakest_cells();
    assert_eq!(weakest.cells, vec![(0, 0), (0, 2)]);
    assert!(approx_eq(weakest.min_signal, -83.4294, 1e-4));
}

#[test]
fn invalid_grid_never_runs() {
    let spec = GridSpec::parse("1.0 2 1\nnnbn\ngnnn\n").unwrap();
    assert!(!spec.grid.is_valid());
    let result = SignalSimulation::new(spec, 0, 0, SimParams::default());
    assert!(matches!(result, Err(SimError::WallMismatch { .. })));
}

#[test]
fn text_log_holds_one_block_per_iteration() {
    let mut sim = simulation("1.0 1 2\nnnnn nnnn\n", 0, 0, SimParams::default());
    let mut log = TextLog::new(Vec::new());
    let summary = sim.run(&mut log).unwrap();
    let text = String::from_utf8(log.finish().unwrap()).unwrap();

    let blocks: Vec<&str> = text.split("\n\n").filter(|b| !b.is_empty()).collect();
    assert_eq!(blocks.len(), summary.iterations as usize);
    assert!(blocks[0].starts_with("[23.0000 -- 0 0.0000] [-83.4294 E 0 1.0000]"));
}

#[test]
fn alternate_parameters_shift_every_signal() {
    let params = SimParams {
        transmit_power_dbm: 30.0,
        ..SimParams::default()
    };
    let mut sim = simulation("1.0 1 2\nnnnn nnnn\n", 0, 0, params);
    sim.run(&mut NullLog).unwrap();
    assert_eq!(sim.grid().cell(0, 0).signal, 30.0);
    assert!(approx_eq(sim.grid().cell(0, 1).signal, 30.0 - 106.4294, 1e-4));
}

#[test]
fn sample_office_grid_converges() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/office.grid");
    let spec = GridSpec::load(path).unwrap();
    assert_eq!((spec.grid.rows(), spec.grid.cols()), (4, 5));

    let mut sim = SignalSimulation::new(spec, 1, 2, SimParams::default()).unwrap();
    let summary = sim.run(&mut NullLog).unwrap();
    assert!(summary.iterations >= 2);

    let weakest = sim.weakest_cells();
    assert!(!weakest.cells.is_empty());
    for cell in sim.grid().cells() {
        assert!(cell.signal >= weakest.min_signal);
    }
    for &(row, col) in &weakest.cells {
        assert_eq!(sim.grid().cell(row, col).signal, weakest.min_signal);
    }
}
