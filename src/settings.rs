//! Simulation settings
//!
//! One immutable value built at startup and handed to the world. Persisted as
//! JSON; any field missing from the file falls back to its default.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// What to do with the averaged boundary-ray direction before reflecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NormalPolicy {
    /// Re-normalize to unit length (elastic reflection)
    #[default]
    Normalized,
    /// Use the raw average; bounce strength then depends on contact geometry
    Raw,
}

impl NormalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalPolicy::Normalized => "Normalized",
            NormalPolicy::Raw => "Raw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normalized" | "normalised" | "unit" => Some(NormalPolicy::Normalized),
            "raw" => Some(NormalPolicy::Raw),
            _ => None,
        }
    }
}

/// Tuning for the pixel probes used by collision detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Angle between neighbouring probe rays (degrees)
    pub angle_step_deg: f32,
    /// Reach of the normal-search rays (pixels)
    pub probe_distance: u32,
    /// Maximum turn of each boundary search away from the travel direction (degrees)
    pub max_sweep_deg: f32,
    /// Distance moved out of the obstacle after a bounce (pixels)
    pub push_out: f32,
    /// Treatment of the averaged normal
    pub normal_policy: NormalPolicy,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            angle_step_deg: PROBE_ANGLE_STEP_DEG,
            probe_distance: PROBE_DISTANCE,
            max_sweep_deg: PROBE_MAX_SWEEP_DEG,
            push_out: PUSH_OUT_DISTANCE,
            normal_policy: NormalPolicy::Normalized,
        }
    }
}

impl ProbeSettings {
    /// Probe angle step in radians
    #[inline]
    pub fn angle_step(&self) -> f32 {
        self.angle_step_deg.to_radians()
    }

    /// Number of rays in a full 360° ring
    pub fn ring_rays(&self) -> u32 {
        ((360.0 / self.angle_step_deg).round() as u32).max(1)
    }

    /// Number of extra rays each boundary search may try beyond the travel direction.
    /// Never wraps back onto the starting ray.
    pub fn sweep_rays(&self) -> u32 {
        let rays = (self.max_sweep_deg / self.angle_step_deg).floor() as u32;
        rays.min(self.ring_rays() - 1)
    }
}

/// Scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Scene ===
    /// Scene width (pixels), shared by the mask and the out-of-bounds check
    pub width: u32,
    /// Scene height (pixels)
    pub height: u32,
    /// Colour treated as empty space in the obstacle image
    pub background: [u8; 3],

    // === Physics ===
    /// Constant acceleration applied every tick
    pub gravity: Vec2,
    /// Radius of every particle
    pub particle_radius: f32,
    /// Mass given to particles spawned without an explicit one
    pub particle_mass: f32,
    /// Collision probe tuning
    pub probe: ProbeSettings,

    // === Driving loop / input ===
    /// Ticks per second
    pub tick_rate: u32,
    /// Speed of launched particles (pixels/tick)
    pub launch_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: SCENE_WIDTH,
            height: SCENE_HEIGHT,
            background: BACKGROUND_RGB,

            gravity: Vec2::new(0.0, GRAVITY),
            particle_radius: PARTICLE_RADIUS,
            particle_mass: PARTICLE_MASS,
            probe: ProbeSettings::default(),

            tick_rate: TICK_RATE,
            launch_speed: LAUNCH_SPEED,
        }
    }
}

impl Settings {
    /// Seconds per tick
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Check that the settings describe a usable scene
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("scene must be non-empty, got {}x{}", self.width, self.height));
        }
        if !self.gravity.is_finite() || self.gravity.y <= 0.0 {
            return invalid(format!("gravity must point down (+y), got {}", self.gravity));
        }
        let max_radius = self.width.min(self.height) as f32;
        if !(self.particle_radius >= 1.0 && self.particle_radius <= max_radius) {
            return invalid(format!(
                "particle radius must be in [1, {max_radius}], got {}",
                self.particle_radius
            ));
        }
        if !(self.particle_mass > 0.0) {
            return invalid(format!("particle mass must be positive, got {}", self.particle_mass));
        }
        let probe = &self.probe;
        if !(probe.angle_step_deg >= MIN_PROBE_ANGLE_STEP_DEG && probe.angle_step_deg <= 360.0) {
            return invalid(format!(
                "probe angle step must be in [{MIN_PROBE_ANGLE_STEP_DEG}, 360], got {}",
                probe.angle_step_deg
            ));
        }
        if probe.probe_distance == 0 || probe.probe_distance as f32 > self.particle_radius {
            return invalid(format!(
                "probe distance must be in [1, {}], got {}",
                self.particle_radius, probe.probe_distance
            ));
        }
        if !(probe.max_sweep_deg >= 0.0 && probe.max_sweep_deg <= 360.0) {
            return invalid(format!("probe sweep must be in [0, 360], got {}", probe.max_sweep_deg));
        }
        if !(probe.push_out > 0.0 && probe.push_out < self.particle_radius) {
            return invalid(format!(
                "push-out must be in (0, {}), got {}",
                self.particle_radius, probe.push_out
            ));
        }
        if self.tick_rate == 0 {
            return invalid("tick rate must be at least 1".to_string());
        }
        if !(self.launch_speed >= 0.0) {
            return invalid(format!("launch speed must be non-negative, got {}", self.launch_speed));
        }
        Ok(())
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
