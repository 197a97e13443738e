//! Fixed-step simulation of elastic point-mass particles in a rectangular box.
//!
//! ```no_run
//! use particlebox::{Container, SimulationConfig};
//!
//! # fn main() -> particlebox::error::Result<()> {
//! let mut config = SimulationConfig::default();
//! config.seed = Some(7);
//! let mut sim = Container::seeded(&config)?;
//! let trajectory = sim.run(config.total_time)?;
//! trajectory.write_json(std::io::stdout())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::SimulationConfig;
pub use crate::core::{Container, Particle, Trajectory, Wall};
