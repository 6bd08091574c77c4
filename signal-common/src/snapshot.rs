use serde::{Serialize, Deserialize};

/// Grid state recorded after one relaxation iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// 1-based iteration number.
    pub iteration: u32,
    pub rows: usize,
    pub cols: usize,
    pub router_row: usize,
    pub router_col: usize,
    /// Largest absolute signal change against the previous iteration (dB).
    pub max_delta: f64,
    /// Signal strength of every cell, row-major.
    pub signals: Vec<f64>,
    /// Attenuation rate of every cell, row-major.
    pub rates: Vec<u32>,
}

impl Snapshot {
    #[inline]
    pub fn signal_at(&self, row: usize, col: usize) -> f64 {
        self.signals[row * self.cols + col]
    }
}
