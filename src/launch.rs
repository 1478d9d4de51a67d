//! Launch helpers for the input layer
//!
//! A launch gesture is "fire from here toward there". The simulation only
//! understands spawn requests, so the gesture is turned into a velocity of
//! fixed magnitude here.

use glam::Vec2;

/// Velocity of magnitude `speed` pointing from `origin` toward `target`
///
/// Returns zero when the two points coincide; the particle then just drops.
pub fn launch_velocity(origin: Vec2, target: Vec2, speed: f32) -> Vec2 {
    (target - origin).normalize_or_zero() * speed
}
