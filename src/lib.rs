//! Mask Bounce - particles bouncing off a bitmap obstacle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (occupancy mask, integration, collisions, world)
//! - `settings`: Immutable scene configuration, loadable from JSON
//! - `bitmap`: Obstacle image loading and mask derivation
//! - `launch`: Input-layer helpers that turn a launch gesture into a spawn
//! - `error`: Collaborator-level errors (config files, images)

pub mod bitmap;
pub mod error;
pub mod launch;
pub mod settings;
pub mod sim;

pub use bitmap::ObstacleBitmap;
pub use error::{BitmapError, ConfigError};
pub use settings::{NormalPolicy, ProbeSettings, Settings};

use glam::Vec2;

/// Scene configuration defaults
pub mod consts {
    /// Scene dimensions (pixels)
    pub const SCENE_WIDTH: u32 = 800;
    pub const SCENE_HEIGHT: u32 = 600;

    /// Simulation ticks per second (one tick per rendered frame)
    pub const TICK_RATE: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the clock will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Downward acceleration per tick (pixels/tick²)
    pub const GRAVITY: f32 = 0.5;

    /// Particle defaults - every particle is a circle of this radius
    pub const PARTICLE_RADIUS: f32 = 20.0;
    pub const PARTICLE_MASS: f32 = 1.0;
    /// Speed given to a launched particle (pixels/tick)
    pub const LAUNCH_SPEED: f32 = 10.0;

    /// Angular spacing between probe rays (degrees)
    pub const PROBE_ANGLE_STEP_DEG: f32 = 5.0;
    /// Finest angle step accepted from a settings file (degrees)
    pub const MIN_PROBE_ANGLE_STEP_DEG: f32 = 0.1;
    /// Reach of the normal-search rays (pixels), shorter than the particle radius
    pub const PROBE_DISTANCE: u32 = 10;
    /// How far each boundary search may turn away from the travel direction (degrees)
    pub const PROBE_MAX_SWEEP_DEG: f32 = 360.0;
    /// Distance a bounced particle is moved back out of the obstacle (pixels)
    pub const PUSH_OUT_DISTANCE: f32 = 2.0;

    /// Pixels of this colour are empty space
    pub const BACKGROUND_RGB: [u8; 3] = [255, 255, 255];
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
