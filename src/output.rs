use crate::grid::Grid;
use anyhow::{Context, Result};
use log::{error, info};
use signal_common::{OutputConfig, SimResult, Snapshot};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Receives every completed iteration of the relaxation.
pub trait IterationLog {
    fn record(&mut self, iteration: u32, grid: &Grid) -> SimResult<()>;
}

/// Discards iterations.
pub struct NullLog;

impl IterationLog for NullLog {
    fn record(&mut self, _iteration: u32, _grid: &Grid) -> SimResult<()> {
        Ok(())
    }
}

/// Plain-text log: one grid row per line, cells separated by spaces, a blank
/// line after each iteration.
pub struct TextLog<W: Write> {
    writer: W,
}

impl TextLog<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create iteration log '{}'", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TextLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> IterationLog for TextLog<W> {
    fn record(&mut self, _iteration: u32, grid: &Grid) -> SimResult<()> {
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                write!(self.writer, "{} ", grid.cell(row, col))?;
            }
            writeln!(self.writer)?;
        }
        writeln!(self.writer)?; // blank line separator
        Ok(())
    }
}

/// Writes recorded snapshots in the configured format ("json", "bincode" or
/// "messagepack"). Unknown formats fall back to JSON. Returns the file written.
pub fn save_snapshots(output: &OutputConfig, snapshots: &[Snapshot]) -> Result<String> {
    let output_format = output.format.as_deref().unwrap_or("json");
    let base = &output.base_filename;

    match output_format {
        "bincode" => {
            // Binary format (much more compact)
            let filename = format!("{}_snapshots.bin", base);
            let file = File::create(&filename)
                .with_context(|| format!("Error creating snapshot file '{}'", filename))?;
            bincode::serialize_into(BufWriter::new(file), snapshots)
                .context("Error serializing snapshots to bincode")?;
            info!("{} snapshots saved to {} (binary format)", snapshots.len(), filename);
            Ok(filename)
        }
        "messagepack" => {
            // MessagePack format (compact and cross-platform)
            let filename = format!("{}_snapshots.msgpack", base);
            let file = File::create(&filename)
                .with_context(|| format!("Error creating snapshot file '{}'", filename))?;
            rmp_serde::encode::write(&mut BufWriter::new(file), snapshots)
                .context("Error serializing snapshots to MessagePack")?;
            info!("{} snapshots saved to {} (MessagePack format)", snapshots.len(), filename);
            Ok(filename)
        }
        other => {
            if other != "json" {
                error!("Unknown output format: {}. Using JSON instead.", other);
            }
            let filename = format!("{}_snapshots.json", base);
            let file = File::create(&filename)
                .with_context(|| format!("Error creating snapshot file '{}'", filename))?;
            serde_json::to_writer(BufWriter::new(file), snapshots)
                .context("Error serializing snapshots to JSON")?;
            info!("{} snapshots saved to {}", snapshots.len(), filename);
            Ok(filename)
        }
    }
}

/// Writes the converged grid as CSV: `row,col,direction,distance,rate,signal`.
pub fn write_grid_csv<W: Write>(writer: W, grid: &Grid) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["row", "col", "direction", "distance", "rate", "signal"])?;
    for (row, col, cell) in grid.iter() {
        csv_writer.write_record(&[
            row.to_string(),
            col.to_string(),
            cell.direction.map_or("--", |d| d.as_str()).to_string(),
            format!("{:.4}", cell.distance),
            cell.rate.to_string(),
            format!("{:.4}", cell.signal),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Saves the final grid to `<base>_final_grid.csv`.
pub fn save_final_grid(output: &OutputConfig, grid: &Grid) -> Result<String> {
    let filename = format!("{}_final_grid.csv", output.base_filename);
    let file = File::create(&filename)
        .with_context(|| format!("Error saving CSV file '{}'", filename))?;
    write_grid_csv(BufWriter::new(file), grid)?;
    info!("Final grid saved to {}", filename);
    Ok(filename)
}
