//! Error types shared by the engine and its tools

use crate::walls::WallSide;
use std::io;
use thiserror::Error;

/// Result type for grid loading and relaxation
pub type SimResult<T> = Result<T, SimError>;

/// Errors that can occur while loading a grid or running the relaxation
#[derive(Error, Debug)]
pub enum SimError {
    /// Grid file could not be opened or read
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Grid file content does not follow the expected layout
    #[error("malformed grid input at line {line}: {reason}")]
    MalformedGrid { line: usize, reason: String },

    /// Two adjacent cells disagree about the wall between them
    #[error(
        "invalid input file: {side} wall of cell ({row}, {col}) does not match cell ({neighbor_row}, {neighbor_col})"
    )]
    WallMismatch {
        row: usize,
        col: usize,
        neighbor_row: usize,
        neighbor_col: usize,
        side: WallSide,
    },

    /// Wall code with no entry in the attenuation table
    #[error("invalid wall type '{code}' in cell ({row}, {col})")]
    UnknownMaterial { code: char, row: usize, col: usize },

    /// Router placed outside the grid
    #[error("router position ({row}, {col}) is outside the {rows}x{cols} grid")]
    RouterOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Iteration cap reached before signals settled
    #[error("signals did not converge after {iterations} iterations (last max delta {max_delta:.6})")]
    NotConverged { iterations: u32, max_delta: f64 },
}
