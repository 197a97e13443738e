#![allow(missing_docs)] // Doc comments live on the public items in each submodule

//! Physics kernel for the particle box.
//!
//! Particle state, wall identifiers, the collision event log, the trajectory
//! record, and the fixed-step `Container` that drives them.

pub mod event;
pub mod particle;
pub mod sim;
pub mod trajectory;
pub mod wall;

pub use event::{CollisionEvent, EventKind};
pub use particle::Particle;
pub use sim::{initialize, initialize_with, step_count, BoundaryMode, CollisionStats, Container};
pub use trajectory::{Point, Trajectory};
pub use wall::Wall;
