//! Simulation world
//!
//! Owns the obstacle mask and every live particle, and advances them one
//! fixed tick at a time: integrate, resolve against the mask, cull.

use glam::Vec2;

use super::collision::{self, Resolution};
use super::integrate;
use super::mask::OccupancyMask;
use super::particle::Particle;
use crate::error::ConfigError;
use crate::launch::launch_velocity;
use crate::settings::Settings;

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Particles whose ring probe touched the obstacle
    pub contacts: usize,
    /// Particles whose velocity was reflected
    pub bounces: usize,
    /// Particles removed for leaving the scene
    pub removed: usize,
}

/// The particle simulation
#[derive(Debug, Clone)]
pub struct SimulationWorld {
    settings: Settings,
    mask: OccupancyMask,
    /// Live particles in spawn order
    particles: Vec<Particle>,
    next_id: u32,
}

impl SimulationWorld {
    /// Create a world over `mask`, which must match the scene size
    pub fn new(settings: Settings, mask: OccupancyMask) -> Result<Self, ConfigError> {
        settings.validate()?;
        if mask.width() != settings.width || mask.height() != settings.height {
            return Err(ConfigError::Invalid(format!(
                "mask is {}x{} but scene is {}x{}",
                mask.width(),
                mask.height(),
                settings.width,
                settings.height
            )));
        }

        log::info!(
            "World {}x{} with {} solid cells, gravity {}",
            settings.width,
            settings.height,
            mask.occupied_count(),
            settings.gravity
        );

        Ok(Self {
            settings,
            mask,
            particles: Vec::new(),
            next_id: 1,
        })
    }

    /// Allocate a new particle ID
    fn next_particle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a particle; returns its ID
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, mass: f32) -> u32 {
        let id = self.next_particle_id();
        self.particles
            .push(Particle::new(id, pos, vel, mass, self.settings.particle_radius));
        log::debug!("Spawned particle {} at {} with velocity {}", id, pos, vel);
        id
    }

    /// Spawn at `origin` moving toward `target` at the configured launch speed
    pub fn launch(&mut self, origin: Vec2, target: Vec2) -> u32 {
        let vel = launch_velocity(origin, target, self.settings.launch_speed);
        self.spawn(origin, vel, self.settings.particle_mass)
    }

    /// Drop every particle
    pub fn clear(&mut self) {
        if !self.particles.is_empty() {
            log::debug!("Cleared {} particles", self.particles.len());
        }
        self.particles.clear();
    }

    /// Advance every particle by one tick
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.particles.is_empty() {
            return report;
        }

        let gravity = self.settings.gravity;
        let (width, height) = (self.settings.width, self.settings.height);
        let mut exited: Vec<u32> = Vec::new();

        for particle in &mut self.particles {
            integrate::step(particle, gravity);

            let resolution = collision::resolve(particle, &self.mask, &self.settings.probe);
            if resolution.is_contact() {
                report.contacts += 1;
            }
            if matches!(resolution, Resolution::Bounced { .. }) {
                report.bounces += 1;
            }

            if particle.is_out_of_bounds(width, height) {
                exited.push(particle.id);
            }
        }

        // Compact once, after the pass
        if !exited.is_empty() {
            self.particles.retain(|p| !exited.contains(&p.id));
            report.removed = exited.len();
            log::debug!("Removed {} particles that left the scene: {:?}", exited.len(), exited);
        }

        report
    }

    /// Live particles in spawn order
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn mask(&self) -> &OccupancyMask {
        &self.mask
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
