use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use signal_common::SimulationConfig;
use signal_engine::output::{save_final_grid, save_snapshots, IterationLog, NullLog, TextLog};
use signal_engine::{GridSpec, SignalSimulation};

/// Finds the weakest-signal cells of a walled grid for a given router position.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grid description file (prompted for when omitted)
    #[arg(short, long)]
    grid: Option<PathBuf>,

    /// Router row (prompted for together with the column when either is omitted)
    #[arg(long)]
    router_row: Option<usize>,

    /// Router column
    #[arg(long)]
    router_col: Option<usize>,

    /// Path to a config.toml; defaults to ./config.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    let args = Args::parse();
    info!("Starting Signal Engine...");

    // --- Load Configuration ---
    let config = load_config(args.config.as_deref())?;
    let params = config.get_sim_params();
    debug!("Simulation Parameters: {:#?}", params);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    // --- Load and Check Grid ---
    let grid_path = match args.grid {
        Some(path) => path,
        None => PathBuf::from(prompt(&mut input, "Enter name of grid data file: ")?),
    };
    let spec = GridSpec::load(&grid_path)
        .with_context(|| format!("Failed to load grid file '{}'", grid_path.display()))?;
    info!(
        "Loaded {}x{} grid from {}.",
        spec.grid.rows(),
        spec.grid.cols(),
        grid_path.display()
    );

    check_grid(&spec, &grid_path)?;

    let (router_row, router_col) = match (args.router_row, args.router_col) {
        (Some(row), Some(col)) => (row, col),
        _ => read_router_position(&mut input)?,
    };

    // --- Initialize Simulation ---
    let mut sim = SignalSimulation::new(spec, router_row, router_col, params)
        .context("Failed to set up simulation")?
        .with_snapshots(config.output.record_snapshots);

    // --- Relaxation Loop ---
    let summary = if config.output.log_iterations {
        let log_path = format!("{}.txt", config.output.base_filename);
        let mut log = TextLog::create(&log_path)?;
        let summary = run(&mut sim, &mut log);
        // Flush even when the run failed so the partial log is kept
        log.finish()
            .with_context(|| format!("Failed to flush iteration log '{}'", log_path))?;
        info!("Iteration log written to {}", log_path);
        summary?
    } else {
        run(&mut sim, &mut NullLog)?
    };
    info!("Finished after {} iterations (final max delta {:.6} dB).", summary.iterations, summary.max_delta);

    // --- Report ---
    print!("{}", sim.weakest_cells());

    // --- Save Recorded Data ---
    if config.output.record_snapshots {
        save_snapshots(&config.output, sim.get_recorded_snapshots())?;
    }
    if config.output.save_final_grid {
        save_final_grid(&config.output, sim.grid())?;
    }

    info!("Simulation Complete.");
    Ok(())
}

fn run<L: IterationLog>(sim: &mut SignalSimulation, log: &mut L) -> Result<signal_engine::RunSummary> {
    sim.run(log).map_err(|e| {
        error!("Relaxation failed: {}", e);
        anyhow::Error::new(e)
    })
}

/// Stops before the router prompt when the grid's shared walls disagree.
fn check_grid(spec: &GridSpec, grid_path: &Path) -> Result<()> {
    if let Err(e) = spec.grid.validate() {
        error!("{}", e);
        println!("ERROR: invalid input file");
        anyhow::bail!("Grid '{}' failed wall validation.", grid_path.display());
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::load(path),
        None if Path::new("config.toml").exists() => SimulationConfig::load("config.toml"),
        None => {
            info!("No config.toml found, using default parameters.");
            Ok(SimulationConfig::default())
        }
    }
}

fn prompt<R: BufRead>(input: &mut R, message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        anyhow::bail!("Unexpected end of input while waiting for: {}", message.trim());
    }
    Ok(line.trim().to_string())
}

fn read_router_position<R: BufRead>(input: &mut R) -> Result<(usize, usize)> {
    let line = prompt(input, "Enter router row and column: ")?;
    let mut fields = line.split_whitespace().map(str::parse::<usize>);
    match (fields.next(), fields.next()) {
        (Some(Ok(row)), Some(Ok(col))) => Ok((row, col)),
        _ => anyhow::bail!("Expected two non-negative integers for router row and column, got '{}'", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn router_position_reads_row_then_column() {
        let mut input = Cursor::new("3 7\n");
        assert_eq!(read_router_position(&mut input).unwrap(), (3, 7));

        let mut input = Cursor::new("  0\t2  \n");
        assert_eq!(read_router_position(&mut input).unwrap(), (0, 2));
    }

    #[test]
    fn router_position_needs_two_fields() {
        let mut input = Cursor::new("4\n");
        let err = read_router_position(&mut input).unwrap_err();
        assert!(err.to_string().contains("'4'"));
    }

    #[test]
    fn router_position_rejects_negative_and_junk() {
        assert!(read_router_position(&mut Cursor::new("-1 2\n")).is_err());
        assert!(read_router_position(&mut Cursor::new("1 two\n")).is_err());
    }

    #[test]
    fn router_position_fails_on_end_of_input() {
        let err = read_router_position(&mut Cursor::new("")).unwrap_err();
        assert!(err.to_string().contains("Unexpected end of input"));
    }

    #[test]
    fn mismatched_grid_stops_before_router_prompt() {
        let spec = GridSpec::parse("1.0 1 2\nnbnn nnng\n").unwrap();
        let err = check_grid(&spec, Path::new("bad.grid")).unwrap_err();
        assert!(err.to_string().contains("bad.grid"));

        let spec = GridSpec::parse("1.0 1 2\nnbnn nnnb\n").unwrap();
        assert!(check_grid(&spec, Path::new("good.grid")).is_ok());
    }
}
