//! Droplet Simulation Library
//!
//! Frame-stepped 2D simulation of droplets sliding down a surface:
//! - Gravity-driven kinematics with static/dynamic friction
//! - Area growth while marching
//! - Trail splitting behind fast droplets
//! - Overlap detection, dormant-droplet reactivation and merging
//! - Boundary clipping
//!
//! The crate is the simulation core only; rendering, pointer input and the
//! host frame loop are external collaborators that call [`DropletSimulator`]
//! once per frame and read back the droplets that moved.

pub mod config;
pub mod physics;

pub use config::{EmitParameters, SimulationConfig};
pub use physics::{Droplet, DropletId, DropletSimulator, DropletStore};
