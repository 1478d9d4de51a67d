//! Mask Bounce entry point
//!
//! Headless driver: loads settings and an obstacle, then plays a scripted
//! volley of launches through the fixed-rate loop and logs what happens.
//!
//! Usage: `mask-bounce [settings.json] [obstacle.png]`

use std::env;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use mask_bounce::sim::{FixedTimestep, SimulationWorld};
use mask_bounce::{ObstacleBitmap, Settings};

/// Length of the scripted run (seconds)
const RUN_SECONDS: f32 = 10.0;
/// Ticks between scripted launches
const LAUNCH_INTERVAL_TICKS: u64 = 15;
/// Scripted "clear" when this many particles are live
const CLEAR_AT: usize = 24;
/// Seed for the launch script
const SCRIPT_SEED: u64 = 0x6d61_736b;

/// Obstacle used when no image is given: a floor, a ramp and a round bump
fn default_obstacle(settings: &Settings) -> ObstacleBitmap {
    let (w, h) = (settings.width as f32, settings.height as f32);
    let bg = settings.background;
    let background = [bg[0], bg[1], bg[2], 255];
    let solid = [0, 0, 0, 255];
    let bump_center = Vec2::new(w * 0.7, h * 0.83);

    ObstacleBitmap::from_fn(settings.width, settings.height, |x, y| {
        let p = Vec2::new(x as f32, y as f32);
        let floor = p.y >= h * 0.83;
        // Ramp falling left to right over the left third
        let ramp = p.x < w * 0.33 && p.y >= h * 0.5 + p.x * 0.4 && p.y <= h * 0.5 + p.x * 0.4 + 12.0;
        let bump = p.distance(bump_center) <= h * 0.1;
        if floor || ramp || bump { solid } else { background }
    })
}

/// One scripted launch from near the top toward a random point in the scene
fn scripted_launch(world: &mut SimulationWorld, rng: &mut Pcg32) {
    let (w, h) = (world.settings().width as f32, world.settings().height as f32);
    let origin = Vec2::new(rng.random_range(0.1 * w..0.9 * w), rng.random_range(0.05 * h..0.2 * h));
    let target = Vec2::new(rng.random_range(0.0..w), rng.random_range(0.3 * h..h));
    world.launch(origin, target);
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Mask Bounce (native) starting...");

    let mut args = env::args().skip(1);

    let settings = match args.next() {
        Some(path) => Settings::load(&path).with_context(|| format!("loading settings from {path}"))?,
        None => {
            log::info!("Using default settings");
            Settings::default()
        }
    };

    let obstacle = match args.next() {
        Some(path) => ObstacleBitmap::load(&path, settings.width, settings.height)
            .with_context(|| format!("loading obstacle image {path}"))?,
        None => {
            log::info!("No obstacle image given, using built-in scene");
            default_obstacle(&settings)
        }
    };

    let mask = obstacle.to_mask(settings.background);
    let mut world = SimulationWorld::new(settings, mask).context("building simulation world")?;
    let mut clock = FixedTimestep::new(world.settings().tick_rate);
    let mut rng = Pcg32::seed_from_u64(SCRIPT_SEED);

    let frame = Duration::from_secs_f32(clock.dt());
    let total_ticks = (RUN_SECONDS / clock.dt()).round() as u64;
    let mut ticks: u64 = 0;
    let (mut launched, mut bounces, mut removed, mut clears) = (0usize, 0usize, 0usize, 0usize);
    let mut last = Instant::now();

    while ticks < total_ticks {
        thread::sleep(frame);
        let now = Instant::now();
        let substeps = clock.advance(now.duration_since(last).as_secs_f32());
        last = now;

        for _ in 0..substeps {
            if ticks % LAUNCH_INTERVAL_TICKS == 0 {
                scripted_launch(&mut world, &mut rng);
                launched += 1;
            }
            if world.len() >= CLEAR_AT {
                world.clear();
                clears += 1;
            }

            let report = world.tick();
            bounces += report.bounces;
            removed += report.removed;
            ticks += 1;

            if ticks % world.settings().tick_rate as u64 == 0 {
                log::info!(
                    "t={}s live={} launched={} bounces={} removed={}",
                    ticks / world.settings().tick_rate as u64,
                    world.len(),
                    launched,
                    bounces,
                    removed
                );
            }
        }
    }

    log::info!(
        "Done: {} ticks, {} launched, {} bounces, {} removed, {} clears, {} still live",
        ticks,
        launched,
        bounces,
        removed,
        clears,
        world.len()
    );
    Ok(())
}
