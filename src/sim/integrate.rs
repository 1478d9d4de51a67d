//! Fixed-step integration
//!
//! One call advances a particle by exactly one tick. The timestep is implicit
//! (velocity is in pixels/tick, gravity in pixels/tick²), so the driving loop
//! decides real-time speed by how often it ticks.

use glam::Vec2;

use super::particle::Particle;

/// Semi-implicit Euler: velocity first, then position with the new velocity
#[inline]
pub fn step(particle: &mut Particle, gravity: Vec2) {
    particle.vel += gravity;
    particle.pos += particle.vel;
}
