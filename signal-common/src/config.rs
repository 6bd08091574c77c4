use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::materials::AttenuationTable;
use crate::sim_params::SimParams;
use std::collections::BTreeMap;
use std::path::Path;

// Router transmit settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RadioConfig {
    #[serde(default = "default_transmit_power")]
    pub transmit_power_dbm: f64,
    #[serde(default = "default_frequency")]
    pub frequency_ghz: f64,
}

// Stopping criteria for the relaxation loop
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ConvergenceConfig {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

// Wall material settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MaterialsConfig {
    /// Reject grids containing wall codes missing from the table.
    #[serde(default)]
    pub strict: bool,
    /// Extra or replacement entries for the built-in attenuation table.
    #[serde(default)]
    pub attenuation: BTreeMap<char, u32>,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
    #[serde(default = "default_true")]
    pub log_iterations: bool, // Text log of every iteration (<base>.txt)
    #[serde(default)]
    pub record_snapshots: bool,
    pub format: Option<String>, // Snapshot format: "json", "bincode", "messagepack"
    #[serde(default)]
    pub save_final_grid: bool, // CSV of the converged grid
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub convergence: ConvergenceConfig,
    #[serde(default)]
    pub materials: MaterialsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for RadioConfig {
    fn default() -> Self {
        RadioConfig {
            transmit_power_dbm: default_transmit_power(),
            frequency_ghz: default_frequency(),
        }
    }
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        ConvergenceConfig {
            epsilon: default_epsilon(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        MaterialsConfig {
            strict: false,
            attenuation: BTreeMap::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: default_base_filename(),
            log_iterations: true,
            record_snapshots: false,
            format: None,
            save_final_grid: false,
        }
    }
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.radio.transmit_power_dbm.is_finite() {
            anyhow::bail!("transmit_power_dbm must be finite.");
        }
        if !(self.radio.frequency_ghz.is_finite() && self.radio.frequency_ghz > 0.0) {
            anyhow::bail!("frequency_ghz must be positive.");
        }
        if !(self.convergence.epsilon.is_finite() && self.convergence.epsilon > 0.0) {
            anyhow::bail!("epsilon must be positive.");
        }
        if self.convergence.max_iterations == 0 {
            anyhow::bail!("max_iterations must be greater than 0.");
        }
        if self.output.base_filename.trim().is_empty() {
            anyhow::bail!("base_filename must not be empty.");
        }
        Ok(())
    }

    /// Converts the configuration into the parameters handed to the engine.
    pub fn get_sim_params(&self) -> SimParams {
        SimParams {
            transmit_power_dbm: self.radio.transmit_power_dbm,
            frequency_ghz: self.radio.frequency_ghz,
            epsilon: self.convergence.epsilon,
            max_iterations: self.convergence.max_iterations,
            attenuation: AttenuationTable::with_overrides(&self.materials.attenuation),
            strict_materials: self.materials.strict,
        }
    }
}

fn default_transmit_power() -> f64 {
    23.0
}

fn default_frequency() -> f64 {
    5.0
}

fn default_epsilon() -> f64 {
    0.0001
}

fn default_max_iterations() -> u32 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_base_filename() -> String {
    "signals".to_string()
}
