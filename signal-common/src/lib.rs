pub mod config;
pub mod error;
pub mod materials;
pub mod sim_params;
pub mod snapshot;
pub mod walls;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, RadioConfig, ConvergenceConfig, MaterialsConfig, OutputConfig};
pub use error::{SimError, SimResult};
pub use materials::AttenuationTable;
pub use sim_params::SimParams;
pub use snapshot::Snapshot;
pub use walls::{WallSide, Walls};
