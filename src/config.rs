//! Run configuration for the particle box.
//!
//! A run is described by three parameter groups plus the run length:
//!
//! ```json
//! {
//!   "container": { "num_particles": 500, "quantum": 2.0, "bounds": [300, 300] },
//!   "initial":   { "temperature": 100.0, "proportionality_factor": 2.0 },
//!   "total_time": 1500.0,
//!   "seed": 42,
//!   "boundary": "reflect"
//! }
//! ```
//!
//! Every group has defaults, so `{}` is a valid configuration.

use crate::core::sim::{BoundaryMode, DEFAULT_MASS, DEFAULT_RADIUS};
use crate::error::{Error, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Container geometry and time quantum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerParameters {
    /// Number of particles (> 0)
    #[serde(default = "default_num_particles")]
    pub num_particles: usize,

    /// Time advanced per step (> 0)
    #[serde(default = "default_quantum")]
    pub quantum: f64,

    /// Container size [width, height], both > 0
    #[serde(default = "default_bounds")]
    pub bounds: [u32; 2],
}

fn default_num_particles() -> usize {
    500
}

fn default_quantum() -> f64 {
    2.0
}

fn default_bounds() -> [u32; 2] {
    [300, 300]
}

impl Default for ContainerParameters {
    fn default() -> Self {
        Self {
            num_particles: default_num_particles(),
            quantum: default_quantum(),
            bounds: default_bounds(),
        }
    }
}

/// Parameters for generating initial particle states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    /// Gas temperature (>= 0); speed scale is proportionality_factor * sqrt(temperature)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_proportionality_factor")]
    pub proportionality_factor: f64,

    /// Mass of every generated particle (> 0)
    #[serde(default = "default_mass")]
    pub mass: f64,

    /// Collision radius of every generated particle (>= 0)
    #[serde(default = "default_radius")]
    pub collision_radius: f64,
}

fn default_temperature() -> f64 {
    100.0
}

fn default_proportionality_factor() -> f64 {
    2.0
}

fn default_mass() -> f64 {
    DEFAULT_MASS
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            proportionality_factor: default_proportionality_factor(),
            mass: default_mass(),
            collision_radius: default_radius(),
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub container: ContainerParameters,

    #[serde(default)]
    pub initial: InitialConditions,

    /// Simulated time to run for (> 0)
    #[serde(default = "default_total_time")]
    pub total_time: f64,

    /// RNG seed; `None` draws a fresh layout every run
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub boundary: BoundaryMode,
}

fn default_total_time() -> f64 {
    1500.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            container: ContainerParameters::default(),
            initial: InitialConditions::default(),
            total_time: default_total_time(),
            seed: None,
            boundary: BoundaryMode::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reject configurations that would produce an empty or degenerate run.
    pub fn validate(&self) -> Result<()> {
        let c = &self.container;
        if c.num_particles == 0 {
            return Err(Error::InvalidParam("num_particles must be > 0".into()));
        }
        if c.bounds.contains(&0) {
            return Err(Error::InvalidParam("bounds must be > 0".into()));
        }
        if !c.quantum.is_finite() || c.quantum <= 0.0 {
            return Err(Error::InvalidParam("quantum must be finite and > 0".into()));
        }
        let init = &self.initial;
        if !init.temperature.is_finite() || init.temperature < 0.0 {
            return Err(Error::InvalidParam(
                "temperature must be finite and >= 0".into(),
            ));
        }
        if !init.proportionality_factor.is_finite() {
            return Err(Error::InvalidParam(
                "proportionality_factor must be finite".into(),
            ));
        }
        if !init.mass.is_finite() || init.mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !init.collision_radius.is_finite() || init.collision_radius < 0.0 {
            return Err(Error::InvalidParam(
                "collision_radius must be finite and >= 0".into(),
            ));
        }
        if !self.total_time.is_finite() || self.total_time <= 0.0 {
            return Err(Error::InvalidParam(
                "total_time must be finite and > 0".into(),
            ));
        }
        Ok(())
    }
}
