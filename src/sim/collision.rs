//! Collision detection and response against the occupancy mask
//!
//! The obstacle has no geometry, only pixels, so everything here is done by
//! probing: short rays are marched outward from the particle centre one pixel
//! at a time and each sample is looked up in the mask.
//!
//! 1. Contact: a full ring of rays out to the particle radius.
//! 2. Normal: starting from the direction of travel, two searches turn in
//!    opposite senses and each stops on an edge of the solid within the
//!    (shorter) probe distance. If the travel ray misses, the edge is the
//!    first ray that hits; if it already hits, the edge is the last ray of
//!    the unbroken run of hits. The bisector of the two edges is the normal.
//! 3. Response: reflect the velocity about that normal and move the particle
//!    a short distance back out of the obstacle.
//!
//! A particle whose centre has sunk into the obstacle touches solid on every
//! ray. Its rays are then judged by their outermost sample only, which still
//! separates solid from open space.
//!
//! The estimated normal points *into* the obstacle, since it is built from
//! rays that struck solid.

use glam::Vec2;

use super::mask::OccupancyMask;
use super::particle::Particle;
use crate::settings::{NormalPolicy, ProbeSettings};
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Averages shorter than this are treated as "no usable normal"
const MIN_NORMAL_LENGTH: f32 = 1e-3;

/// Outcome of resolving one particle for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// No probe touched the obstacle
    Clear,
    /// Touching, but not moving, so there is no travel direction to search from
    Stationary,
    /// Touching, but one or both boundary searches found nothing; retried next tick
    Unresolved,
    /// Velocity reflected and position corrected
    Bounced { normal: Vec2 },
    /// Already moving away from the surface; only the position was corrected
    PushedOut { normal: Vec2 },
}

impl Resolution {
    /// Whether contact was detected this tick
    pub fn is_contact(&self) -> bool {
        !matches!(self, Resolution::Clear)
    }

    /// Estimated normal, if one was found
    pub fn normal(&self) -> Option<Vec2> {
        match *self {
            Resolution::Bounced { normal } | Resolution::PushedOut { normal } => Some(normal),
            _ => None,
        }
    }
}

/// Sense in which a boundary search turns away from the travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Decreasing angle
    Clockwise,
    /// Increasing angle
    CounterClockwise,
}

impl Turn {
    #[inline]
    fn sign(self) -> f32 {
        match self {
            Turn::Clockwise => -1.0,
            Turn::CounterClockwise => 1.0,
        }
    }
}

/// March a unit-direction ray from `origin`, sampling at 1..=reach pixels
#[inline]
pub fn ray_hits(mask: &OccupancyMask, origin: Vec2, dir: Vec2, reach: u32) -> bool {
    (1..=reach).any(|r| mask.occupied_at(origin + dir * r as f32))
}

/// Whether any ring probe around `pos` out to `radius` lands in the obstacle
///
/// Only discrete rays are sampled, so features thinner than the gap between
/// neighbouring rays can slip through.
pub fn detect_contact(mask: &OccupancyMask, pos: Vec2, radius: f32, probe: &ProbeSettings) -> bool {
    let reach = radius.floor() as u32;
    let step = probe.angle_step();
    (0..probe.ring_rays()).any(|i| ray_hits(mask, pos, polar_to_cartesian(1.0, i as f32 * step), reach))
}

/// Which samples of a probe ray have to be solid for the ray to count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RayTest {
    /// Any sample along the ray
    Touches,
    /// The outermost sample
    EndsIn,
}

impl RayTest {
    fn hits(self, mask: &OccupancyMask, origin: Vec2, dir: Vec2, reach: u32) -> bool {
        match self {
            RayTest::Touches => ray_hits(mask, origin, dir, reach),
            RayTest::EndsIn => reach > 0 && mask.occupied_at(origin + dir * reach as f32),
        }
    }
}

/// Whether every ring ray touches solid within the probe distance
pub fn is_buried(mask: &OccupancyMask, pos: Vec2, probe: &ProbeSettings) -> bool {
    let step = probe.angle_step();
    (0..probe.ring_rays())
        .all(|i| ray_hits(mask, pos, polar_to_cartesian(1.0, i as f32 * step), probe.probe_distance))
}

fn ray_test_at(mask: &OccupancyMask, pos: Vec2, probe: &ProbeSettings) -> RayTest {
    if is_buried(mask, pos, probe) { RayTest::EndsIn } else { RayTest::Touches }
}

fn sweep(
    mask: &OccupancyMask,
    pos: Vec2,
    travel_angle: f32,
    turn: Turn,
    probe: &ProbeSettings,
    test: RayTest,
) -> Option<Vec2> {
    let step = probe.angle_step() * turn.sign();
    let hits = |dir: Vec2| test.hits(mask, pos, dir, probe.probe_distance);
    let travel = polar_to_cartesian(1.0, travel_angle);
    let mut rays = (1..=probe.sweep_rays()).map(|k| polar_to_cartesian(1.0, travel_angle + k as f32 * step));

    if !hits(travel) {
        return rays.find(|&dir| hits(dir));
    }

    let mut edge = travel;
    for dir in rays {
        if !hits(dir) {
            break;
        }
        edge = dir;
    }
    Some(edge)
}

/// Turn from `travel_angle` in one sense until reaching an edge of the solid
///
/// The travel direction itself is tried first. If it misses, returns the
/// first ray that hits, or `None` once the sweep budget is spent. If it hits,
/// keeps turning while rays still hit and returns the last of them.
pub fn search_boundary(
    mask: &OccupancyMask,
    pos: Vec2,
    travel_angle: f32,
    turn: Turn,
    probe: &ProbeSettings,
) -> Option<Vec2> {
    sweep(mask, pos, travel_angle, turn, probe, ray_test_at(mask, pos, probe))
}

/// Average two boundary rays into a normal estimate
///
/// `None` when the rays nearly cancel out (they point in opposite directions).
pub fn combine_rays(cw: Vec2, ccw: Vec2, policy: NormalPolicy) -> Option<Vec2> {
    let average = (cw + ccw) * 0.5;
    let length = average.length();
    if !(length >= MIN_NORMAL_LENGTH) {
        return None;
    }

    match policy {
        NormalPolicy::Normalized => Some(average / length),
        NormalPolicy::Raw => Some(average),
    }
}

/// Estimate the surface normal (pointing into the obstacle) near a particle
///
/// Returns `None` for a stationary particle, when either search fails, or
/// when the two boundary rays cancel out.
pub fn estimate_normal(mask: &OccupancyMask, particle: &Particle, probe: &ProbeSettings) -> Option<Vec2> {
    if particle.vel == Vec2::ZERO {
        return None;
    }
    let (_, travel_angle) = cartesian_to_polar(particle.vel);
    let test = ray_test_at(mask, particle.pos, probe);

    let cw = sweep(mask, particle.pos, travel_angle, Turn::Clockwise, probe, test)?;
    let ccw = sweep(mask, particle.pos, travel_angle, Turn::CounterClockwise, probe, test)?;
    let normal = combine_rays(cw, ccw, probe.normal_policy)?;

    // Edges more than half a turn apart average to the open side
    let dir = normal.normalize_or_zero();
    let hits = |d: Vec2| test.hits(mask, particle.pos, d, probe.probe_distance);
    if !hits(dir) && hits(-dir) {
        Some(-normal)
    } else {
        Some(normal)
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n. Energy-conserving only when `n` is
/// unit length.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Detect and resolve contact between one particle and the mask
pub fn resolve(particle: &mut Particle, mask: &OccupancyMask, probe: &ProbeSettings) -> Resolution {
    if !detect_contact(mask, particle.pos, particle.radius, probe) {
        return Resolution::Clear;
    }
    if particle.vel == Vec2::ZERO {
        return Resolution::Stationary;
    }
    let Some(normal) = estimate_normal(mask, particle, probe) else {
        log::trace!("particle {} touching at {} but no boundary found", particle.id, particle.pos);
        return Resolution::Unresolved;
    };

    let moving_into = particle.vel.dot(normal) > 0.0;
    if moving_into {
        particle.vel = reflect_velocity(particle.vel, normal);
    }
    // Push out along the unit normal regardless of policy
    particle.pos -= normal.normalize_or_zero() * probe.push_out;

    log::trace!(
        "particle {} contact at {}, normal {}, vel now {}",
        particle.id,
        particle.pos,
        normal,
        particle.vel
    );

    if moving_into {
        Resolution::Bounced { normal }
    } else {
        Resolution::PushedOut { normal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const W: u32 = 200;
    const H: u32 = 200;

    /// Solid from row `top` down
    fn floor_mask(top: u32) -> OccupancyMask {
        OccupancyMask::from_fn(W, H, |_, y| y >= top)
    }

    fn particle(pos: Vec2, vel: Vec2) -> Particle {
        Particle::new(1, pos, vel, 1.0, 20.0)
    }

    #[test]
    fn test_ray_hits_within_reach_only() {
        let mask = floor_mask(100);
        let down = Vec2::new(0.0, 1.0);
        assert!(ray_hits(&mask, Vec2::new(50.0, 95.0), down, 5));
        assert!(!ray_hits(&mask, Vec2::new(50.0, 95.0), down, 4));
        // Never samples the origin itself
        assert!(!ray_hits(&mask, Vec2::new(50.0, 150.0), down, 0));
    }

    #[test]
    fn test_detect_contact_at_radius() {
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        assert!(detect_contact(&mask, Vec2::new(100.0, 80.5), 20.0, &probe));
        assert!(!detect_contact(&mask, Vec2::new(100.0, 79.0), 20.0, &probe));
    }

    #[test]
    fn test_detect_contact_empty_mask() {
        let mask = OccupancyMask::empty(W, H);
        let probe = ProbeSettings::default();
        assert!(!detect_contact(&mask, Vec2::new(100.0, 100.0), 20.0, &probe));
    }

    #[test]
    fn test_thin_feature_between_rays_is_missed() {
        // A single solid pixel at distance 20 that falls between 5° rays
        let mask = OccupancyMask::from_fn(W, H, |x, y| x == 119 && y == 102);
        let pos = Vec2::new(100.0, 100.0);
        assert!(!detect_contact(&mask, pos, 20.0, &ProbeSettings::default()));

        let fine = ProbeSettings {
            angle_step_deg: 0.5,
            ..Default::default()
        };
        assert!(detect_contact(&mask, pos, 20.0, &fine));
    }

    #[test]
    fn test_search_boundary_straight_ahead_finds_edges() {
        // 6px above the floor, rays steeper than ~37° reach it
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        let pos = Vec2::new(100.0, 94.0);
        let cw = search_boundary(&mask, pos, FRAC_PI_2, Turn::Clockwise, &probe).unwrap();
        let ccw = search_boundary(&mask, pos, FRAC_PI_2, Turn::CounterClockwise, &probe).unwrap();
        assert!((cw - polar_to_cartesian(1.0, 40f32.to_radians())).length() < 1e-4, "cw edge {cw}");
        assert!((ccw - polar_to_cartesian(1.0, 140f32.to_radians())).length() < 1e-4, "ccw edge {ccw}");
    }

    #[test]
    fn test_search_boundary_turns_in_opposite_senses() {
        // Moving right with a floor 8px below: counter-clockwise (increasing
        // angle) reaches the floor from the right, clockwise goes the long way
        // round and reaches it from the left.
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        let pos = Vec2::new(100.0, 92.0);

        let ccw = search_boundary(&mask, pos, 0.0, Turn::CounterClockwise, &probe).unwrap();
        let cw = search_boundary(&mask, pos, 0.0, Turn::Clockwise, &probe).unwrap();

        assert!(ccw.y > 0.0 && ccw.x > 0.0, "ccw ray {ccw} should lean down-right");
        assert!(cw.y > 0.0 && cw.x < 0.0, "cw ray {cw} should lean down-left");
        // Symmetric about the vertical
        assert!((ccw.x + cw.x).abs() < 1e-4);
        assert!((ccw.y - cw.y).abs() < 1e-4);
    }

    #[test]
    fn test_search_boundary_budget_exhausted() {
        let mask = floor_mask(100);
        let probe = ProbeSettings {
            max_sweep_deg: 45.0,
            ..Default::default()
        };
        // Travelling up, floor is behind us and out of the sweep
        let pos = Vec2::new(100.0, 92.0);
        assert!(search_boundary(&mask, pos, -FRAC_PI_2, Turn::Clockwise, &probe).is_none());
    }

    #[test]
    fn test_estimate_normal_flat_floor() {
        let mask = floor_mask(100);
        let p = particle(Vec2::new(100.0, 92.0), Vec2::new(1.0, 0.0));
        let normal = estimate_normal(&mask, &p, &ProbeSettings::default()).unwrap();
        assert!((normal - Vec2::new(0.0, 1.0)).length() < 1e-4, "normal was {normal}");
    }

    #[test]
    fn test_estimate_normal_raw_is_shorter() {
        let mask = floor_mask(100);
        let p = particle(Vec2::new(100.0, 92.0), Vec2::new(1.0, 0.0));
        let probe = ProbeSettings {
            normal_policy: NormalPolicy::Raw,
            ..Default::default()
        };
        let normal = estimate_normal(&mask, &p, &probe).unwrap();
        assert!(normal.length() < 1.0);
        assert!(normal.x.abs() < 1e-4);
        assert!(normal.y > 0.0);
    }

    #[test]
    fn test_estimate_normal_stationary() {
        let mask = floor_mask(100);
        let p = particle(Vec2::new(100.0, 92.0), Vec2::ZERO);
        assert!(estimate_normal(&mask, &p, &ProbeSettings::default()).is_none());
    }

    /// Angle between two directions, in degrees
    fn angle_between(a: Vec2, b: Vec2) -> f32 {
        a.angle_to(b).abs().to_degrees()
    }

    #[test]
    fn test_estimate_normal_travel_ray_hits() {
        // Heading into the floor at an angle: the normal is the floor's, not the travel direction
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        let p = particle(Vec2::new(100.0, 94.0), Vec2::new(2.0, 5.0));
        let normal = estimate_normal(&mask, &p, &probe).unwrap();
        assert!(angle_between(normal, Vec2::new(0.0, 1.0)) <= probe.angle_step_deg / 2.0 + 1e-3);
        assert!(angle_between(normal, p.vel) > 15.0);
    }

    #[test]
    fn test_estimate_normal_on_slope() {
        // Solid below the line y = x + 100; into-solid normal is (-1, 1)/sqrt(2)
        let mask = OccupancyMask::from_fn(400, 400, |x, y| y >= x + 100);
        let probe = ProbeSettings::default();
        let expected = Vec2::new(-1.0, 1.0).normalize();

        for (pos, vel) in [
            (Vec2::new(200.0, 292.0), Vec2::new(0.0, 5.0)),
            (Vec2::new(200.0, 294.0), Vec2::new(3.0, 4.0)),
            (Vec2::new(150.0, 245.0), Vec2::new(-1.0, 6.0)),
        ] {
            let p = particle(pos, vel);
            let normal = estimate_normal(&mask, &p, &probe).unwrap();
            let error = angle_between(normal, expected);
            assert!(error <= probe.angle_step_deg, "normal {normal} is {error}° off at {pos}");
        }
    }

    #[test]
    fn test_resolve_slope_turns_fall_sideways() {
        let mask = OccupancyMask::from_fn(400, 400, |x, y| y >= x + 100);
        let mut p = particle(Vec2::new(200.0, 292.0), Vec2::new(0.0, 5.0));

        let result = resolve(&mut p, &mask, &ProbeSettings::default());
        assert!(matches!(result, Resolution::Bounced { .. }));
        assert!((p.vel - Vec2::new(5.0, 0.0)).length() < 1e-3, "vel {}", p.vel);
        // Pushed up and to the right, away from the slope
        assert!(p.pos.x > 200.0 && p.pos.y < 292.0);
    }

    #[test]
    fn test_is_buried() {
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        assert!(is_buried(&mask, Vec2::new(100.0, 103.0), &probe));
        assert!(!is_buried(&mask, Vec2::new(100.0, 94.0), &probe));
    }

    #[test]
    fn test_estimate_normal_when_buried() {
        // Centre 3px inside the floor: every ray touches solid
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        let p = particle(Vec2::new(100.0, 103.0), Vec2::new(1.0, 14.0));
        let normal = estimate_normal(&mask, &p, &probe).unwrap();
        assert!(angle_between(normal, Vec2::new(0.0, 1.0)) <= probe.angle_step_deg / 2.0 + 1e-3);

        // Same answer while climbing back out
        let p = particle(Vec2::new(100.0, 103.0), Vec2::new(1.0, -14.0));
        let normal = estimate_normal(&mask, &p, &probe).unwrap();
        assert!(angle_between(normal, Vec2::new(0.0, 1.0)) <= probe.angle_step_deg / 2.0 + 1e-3);
    }

    #[test]
    fn test_resolve_buried_keeps_horizontal_direction() {
        let mask = floor_mask(100);
        let mut p = particle(Vec2::new(100.0, 103.0), Vec2::new(1.0, 14.0));
        let result = resolve(&mut p, &mask, &ProbeSettings::default());
        assert!(matches!(result, Resolution::Bounced { .. }));
        assert!(p.vel.x > 0.0 && p.vel.y < 0.0, "vel {}", p.vel);
        assert!(p.pos.y < 103.0);
    }

    #[test]
    fn test_estimate_normal_half_sweep_misses_far_edge() {
        // Moving right, only half a turn each way: clockwise never reaches the floor
        let mask = floor_mask(100);
        let p = particle(Vec2::new(100.0, 92.0), Vec2::new(1.0, 0.0));
        let probe = ProbeSettings {
            max_sweep_deg: 180.0,
            ..Default::default()
        };
        assert!(estimate_normal(&mask, &p, &probe).is_none());
    }

    #[test]
    fn test_combine_rays() {
        let right = Vec2::new(1.0, 0.0);
        let down = Vec2::new(0.0, 1.0);

        let n = combine_rays(right, down, NormalPolicy::Normalized).unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - n.y).abs() < 1e-6);

        let raw = combine_rays(right, down, NormalPolicy::Raw).unwrap();
        assert!((raw - Vec2::new(0.5, 0.5)).length() < 1e-6);

        // Opposite rays cancel
        assert!(combine_rays(right, -right, NormalPolicy::Normalized).is_none());
        assert!(combine_rays(right, -right, NormalPolicy::Raw).is_none());
    }

    #[test]
    fn test_reflect_velocity() {
        // Moving right into a wall on the right (normal into the wall)
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);

        // Oblique: tangential part kept
        let reflected = reflect_velocity(Vec2::new(3.0, 4.0), Vec2::new(0.0, 1.0));
        assert!((reflected - Vec2::new(3.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn test_resolve_clear() {
        let mask = floor_mask(100);
        let mut p = particle(Vec2::new(100.0, 50.0), Vec2::new(0.0, 3.0));
        let before = p.clone();
        assert_eq!(resolve(&mut p, &mask, &ProbeSettings::default()), Resolution::Clear);
        assert_eq!(p, before);
    }

    #[test]
    fn test_resolve_flat_bounce() {
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        let mut p = particle(Vec2::new(100.0, 94.0), Vec2::new(0.0, 6.0));

        let result = resolve(&mut p, &mask, &probe);
        assert!(matches!(result, Resolution::Bounced { .. }));
        assert!((p.vel - Vec2::new(0.0, -6.0)).length() < 1e-4);
        // Pushed up, out of the floor
        assert!((p.pos - Vec2::new(100.0, 94.0 - probe.push_out)).length() < 1e-4);
    }

    #[test]
    fn test_resolve_shallow_bounce_keeps_tangent() {
        let mask = floor_mask(100);
        let mut p = particle(Vec2::new(100.0, 92.0), Vec2::new(5.0, 1.0));
        let speed = p.speed();

        let result = resolve(&mut p, &mask, &ProbeSettings::default());
        assert!(matches!(result, Resolution::Bounced { .. }));
        assert!(p.vel.y < 0.0, "vertical should flip, got {}", p.vel);
        // Normal is off vertical by at most half a probe step
        assert!((p.vel.x - 5.0).abs() < 0.2, "tangent mostly kept, got {}", p.vel);
        assert!((p.speed() - speed).abs() < 1e-3);
    }

    #[test]
    fn test_resolve_raw_policy_loses_speed() {
        let mask = floor_mask(100);
        let probe = ProbeSettings {
            normal_policy: NormalPolicy::Raw,
            ..Default::default()
        };
        let mut p = particle(Vec2::new(100.0, 92.0), Vec2::new(5.0, 1.0));
        let speed = p.speed();

        resolve(&mut p, &mask, &probe);
        assert!(p.speed() < speed);
    }

    #[test]
    fn test_resolve_stationary_leaves_particle() {
        let mask = floor_mask(100);
        let mut p = particle(Vec2::new(100.0, 95.0), Vec2::ZERO);
        let before = p.clone();
        assert_eq!(resolve(&mut p, &mask, &ProbeSettings::default()), Resolution::Stationary);
        assert_eq!(p, before);
    }

    #[test]
    fn test_resolve_unresolved_when_surface_out_of_probe_reach() {
        // Inside ring reach (20) but beyond probe distance (10)
        let mask = floor_mask(100);
        let mut p = particle(Vec2::new(100.0, 85.0), Vec2::new(0.0, 2.0));
        let before = p.clone();
        assert_eq!(resolve(&mut p, &mask, &ProbeSettings::default()), Resolution::Unresolved);
        assert_eq!(p, before);
    }

    #[test]
    fn test_resolve_moving_away_only_pushes_out() {
        let mask = floor_mask(100);
        let probe = ProbeSettings::default();
        let mut p = particle(Vec2::new(100.0, 95.0), Vec2::new(0.0, -3.0));

        let result = resolve(&mut p, &mask, &probe);
        assert!(matches!(result, Resolution::PushedOut { .. }));
        assert_eq!(p.vel, Vec2::new(0.0, -3.0));
        assert!(p.pos.y < 95.0);
    }

    #[test]
    fn test_resolution_accessors() {
        assert!(!Resolution::Clear.is_contact());
        assert!(Resolution::Unresolved.is_contact());
        assert_eq!(Resolution::Stationary.normal(), None);
        let n = Vec2::new(0.0, 1.0);
        assert_eq!(Resolution::Bounced { normal: n }.normal(), Some(n));
    }
}
