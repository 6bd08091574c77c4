use crate::materials::AttenuationTable;
use serde::{Deserialize, Serialize};

/// Engine parameters derived from the configuration. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Radio
    pub transmit_power_dbm: f64, // Fixed signal level of the router cell
    pub frequency_ghz: f64,

    // Convergence
    pub epsilon: f64, // Signals closer than this between iterations count as settled
    pub max_iterations: u32,

    // Materials
    pub attenuation: AttenuationTable,
    pub strict_materials: bool, // Reject grids with unknown wall codes
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            transmit_power_dbm: 23.0,
            frequency_ghz: 5.0,
            epsilon: 0.0001,
            max_iterations: 10_000,
            attenuation: AttenuationTable::default(),
            strict_materials: false,
        }
    }
}
