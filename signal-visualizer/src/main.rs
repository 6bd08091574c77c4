use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn, LevelFilter};
use palette::{FromColor, Hsv, Srgb};
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use rayon::prelude::*;
use signal_common::Snapshot;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input snapshot file (.json, .bin or .msgpack)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the rendered images
    #[arg(short, long, default_value = "frames")]
    output_dir: PathBuf,

    /// Size of one grid cell in pixels
    #[arg(long, default_value_t = 32)]
    cell_px: u32,

    /// Render every Nth iteration (the last one is always rendered)
    #[arg(long, default_value_t = 1)]
    every: usize,

    /// Also draw a convergence chart (max delta per iteration)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    chart: bool,
}

// Router outline and background (RGBA)
const ROUTER_COLOR: [u8; 4] = [0, 0, 0, 255];
const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

// Hue for the weakest and strongest signal (degrees): red to green
const WEAK_HUE: f32 = 0.0;
const STRONG_HUE: f32 = 120.0;

// Deltas of exactly zero cannot be shown on a log axis
const DELTA_FLOOR: f64 = 1e-9;

/// Reads snapshots, picking the decoder from the file extension.
fn read_snapshots(path: &Path) -> Result<Vec<Snapshot>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let snapshots: Vec<Snapshot> = match path.extension().and_then(|ext| ext.to_str()) {
        Some("bin") => bincode::deserialize_from(reader).context("Failed to decode bincode snapshots")?,
        Some("msgpack") => rmp_serde::from_read(reader).context("Failed to decode MessagePack snapshots")?,
        Some("json") => serde_json::from_reader(reader).context("Failed to decode JSON snapshots")?,
        other => {
            warn!("Unrecognized extension {:?}, trying JSON.", other);
            serde_json::from_reader(reader).context("Failed to decode JSON snapshots")?
        }
    };
    check_dimensions(&snapshots)?;
    Ok(snapshots)
}

/// Every snapshot must hold exactly one value per cell and a router inside the grid.
fn check_dimensions(snapshots: &[Snapshot]) -> Result<()> {
    for snapshot in snapshots {
        let cells = snapshot.rows * snapshot.cols;
        if snapshot.signals.len() != cells || snapshot.rates.len() != cells {
            anyhow::bail!(
                "Snapshot {} is {}x{} but holds {} signals and {} rates",
                snapshot.iteration,
                snapshot.rows,
                snapshot.cols,
                snapshot.signals.len(),
                snapshot.rates.len()
            );
        }
        if snapshot.router_row >= snapshot.rows || snapshot.router_col >= snapshot.cols {
            anyhow::bail!(
                "Snapshot {} places the router at ({}, {}) outside its {}x{} grid",
                snapshot.iteration,
                snapshot.router_row,
                snapshot.router_col,
                snapshot.rows,
                snapshot.cols
            );
        }
    }
    Ok(())
}

/// Signal range over every non-router cell of every snapshot.
fn signal_range(snapshots: &[Snapshot]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for snapshot in snapshots {
        let router_idx = snapshot.router_row * snapshot.cols + snapshot.router_col;
        for (idx, &signal) in snapshot.signals.iter().enumerate() {
            if idx == router_idx || !signal.is_finite() {
                continue;
            }
            lo = lo.min(signal);
            hi = hi.max(signal);
        }
    }
    if lo > hi {
        // Only the router cell: any non-empty range will do
        return (-1.0, 0.0);
    }
    (lo, hi)
}

/// Colour for `signal` on a weak-to-strong hue gradient.
fn signal_color(signal: f64, lo: f64, hi: f64) -> [u8; 4] {
    let span = hi - lo;
    let t = if span > 0.0 { ((signal - lo) / span).clamp(0.0, 1.0) } else { 1.0 };
    let hue = WEAK_HUE + (STRONG_HUE - WEAK_HUE) * t as f32;

    let hsv: Hsv = Hsv::new(hue, 0.75, 0.9);
    let rgb: Srgb = Srgb::from_color(hsv);
    [
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
        255,
    ]
}

/// Heat map of one snapshot, one square per cell, router outlined.
fn draw_heatmap(snapshot: &Snapshot, cell_px: u32, lo: f64, hi: f64) -> RgbaImage {
    let width = snapshot.cols as u32 * cell_px;
    let height = snapshot.rows as u32 * cell_px;
    let mut image = ImageBuffer::from_pixel(width, height, Rgba(BACKGROUND));

    for row in 0..snapshot.rows {
        for col in 0..snapshot.cols {
            let x = (col as u32 * cell_px) as i32;
            let y = (row as u32 * cell_px) as i32;
            let rect = Rect::at(x, y).of_size(cell_px, cell_px);
            let color = if row == snapshot.router_row && col == snapshot.router_col {
                signal_color(hi, lo, hi)
            } else {
                signal_color(snapshot.signal_at(row, col), lo, hi)
            };
            draw_filled_rect_mut(&mut image, rect, Rgba(color));
        }
    }

    let router = Rect::at(
        (snapshot.router_col as u32 * cell_px) as i32,
        (snapshot.router_row as u32 * cell_px) as i32,
    )
    .of_size(cell_px, cell_px);
    draw_hollow_rect_mut(&mut image, router, Rgba(ROUTER_COLOR));

    image
}

fn plot_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow::anyhow!("Failed to draw convergence chart: {}", e)
}

/// Log-scale line chart of the largest signal change per iteration.
fn draw_convergence_chart(snapshots: &[Snapshot], path: &Path) -> Result<()> {
    let points: Vec<(u32, f64)> = snapshots
        .iter()
        .map(|s| (s.iteration, s.max_delta.max(DELTA_FLOOR)))
        .collect();
    let last_iteration = points.last().map_or(1, |p| p.0).max(1);
    let (y_lo, y_hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Convergence", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(1u32..last_iteration + 1, (y_lo * 0.5..y_hi * 2.0).log_scale())
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("iteration")
        .y_desc("max signal change (dB)")
        .draw()
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(plot_err)?;
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Indices of the snapshots to render: every `every`-th one plus the last.
fn frame_indices(count: usize, every: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let mut indices: Vec<usize> = (0..count).step_by(every.max(1)).collect();
    if indices.last() != Some(&(count - 1)) {
        indices.push(count - 1);
    }
    indices
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    // Initialize logger
    Builder::from_default_env()
        .filter(None, LevelFilter::Info)
        .init();

    info!("Starting Signal Visualizer...");
    info!("Input file: {}", args.input.display());
    info!("Output directory: {}", args.output_dir.display());

    let snapshots = read_snapshots(&args.input)?;
    info!("Found {} snapshots in the file", snapshots.len());
    if snapshots.is_empty() {
        warn!("Input file contains no snapshots. Exiting.");
        return Ok(());
    }
    if args.cell_px == 0 {
        anyhow::bail!("cell_px must be greater than 0.");
    }

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir.display()))?;

    let (lo, hi) = signal_range(&snapshots);
    info!("Signal range (excluding router): {:.2} .. {:.2} dBm", lo, hi);

    let indices = frame_indices(snapshots.len(), args.every);
    debug!("Rendering snapshots {:?}", indices);

    // Set up progress bar
    let progress_bar = ProgressBar::new(indices.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );

    let start_time = Instant::now();
    indices.par_iter().try_for_each(|&idx| -> Result<()> {
        let snapshot = &snapshots[idx];
        let image = draw_heatmap(snapshot, args.cell_px, lo, hi);
        let path = args.output_dir.join(format!("iteration_{:05}.png", snapshot.iteration));
        image
            .save(&path)
            .with_context(|| format!("Failed to write frame {}", path.display()))?;
        progress_bar.inc(1);
        Ok(())
    })?;
    progress_bar.finish();
    info!(
        "Rendered {} frames in {:.2} s",
        indices.len(),
        start_time.elapsed().as_secs_f64()
    );

    if args.chart {
        let chart_path = args.output_dir.join("convergence.png");
        draw_convergence_chart(&snapshots, &chart_path)?;
        info!("Convergence chart written to {}", chart_path.display());
    }

    info!("Visualization Complete.");
    Ok(())
}
