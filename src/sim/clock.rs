//! Fixed-rate tick clock
//!
//! Turns variable frame times into a whole number of fixed simulation steps.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};

/// Accumulator for a fixed-timestep loop
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Seconds per tick
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
        }
    }

    /// Seconds per tick
    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Add a frame's elapsed time and return how many ticks to run now
    ///
    /// Long frames are clamped and the step count is capped at
    /// `MAX_SUBSTEPS`, dropping the backlog, so a stall never snowballs.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= self.dt && steps < MAX_SUBSTEPS {
            self.accumulator -= self.dt;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(self.dt);
        }
        steps
    }

    /// Fraction of a tick left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }
}
