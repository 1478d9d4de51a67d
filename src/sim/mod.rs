//! Deterministic simulation module
//!
//! Everything that moves lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `tick` per step, no wall-clock time)
//! - Stable iteration order (spawn order)
//! - The mask is read-only once the world exists
//! - No rendering, image decoding or platform dependencies

pub mod clock;
pub mod collision;
pub mod integrate;
pub mod mask;
pub mod particle;
pub mod world;

pub use clock::FixedTimestep;
pub use collision::{
    Resolution, Turn, combine_rays, detect_contact, estimate_normal, is_buried, reflect_velocity, resolve,
    search_boundary,
};
pub use integrate::step;
pub use mask::OccupancyMask;
pub use particle::Particle;
pub use world::{SimulationWorld, TickReport};
