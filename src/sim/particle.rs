//! Particle state

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circular projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Stable identity, assigned by the world at spawn
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Carried for callers; no force or response reads it
    pub mass: f32,
    /// Same for every particle in a world
    pub radius: f32,
}

impl Particle {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, mass: f32, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            mass,
            radius,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Whether the particle has left the scene through the sides or bottom.
    /// Leaving through the top is allowed; gravity brings it back.
    #[inline]
    pub fn is_out_of_bounds(&self, width: u32, height: u32) -> bool {
        self.pos.y > height as f32 || self.pos.x < 0.0 || self.pos.x > width as f32
    }
}
