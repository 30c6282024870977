//! Physics simulation modules
//!
//! Contains the droplet simulation core:
//! - Droplet: per-entity record and its pure derived quantities
//! - Store: owning container keyed by stable, never-reused identifiers
//! - Simulation: frame driver and the per-tick stages

pub mod droplet;
pub mod simulation;
pub mod store;

pub use droplet::{Droplet, BIRTH_NOT_INITIALIZED, BIRTH_OUTSIDE_CONTACT};
pub use simulation::DropletSimulator;
pub use store::{DropletId, DropletStore};
