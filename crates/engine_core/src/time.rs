//! Fixed-step time management for the simulation loop.
//!
//! Frame time is accumulated and drained in fixed steps. A long frame (a
//! dropped frame, a debugger pause) is capped so the loop never spirals: the
//! excess is discarded and the next tick simply sees a full fixed step.

use std::time::{Duration, Instant};

/// Upper bound on fixed steps drained per frame.
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Manages frame timing and the fixed-step accumulator.
#[derive(Debug)]
pub struct Time {
    /// Time of the last wall-clock update.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total simulated time.
    elapsed: Duration,
    /// Fixed ticks consumed since start.
    tick_count: u64,
    /// Fixed timestep for the simulation (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time not yet consumed by fixed ticks.
    accumulator: Duration,
    /// Fixed steps drained during the current frame.
    steps_this_frame: u32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager running at 60 Hz.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            tick_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
            steps_this_frame: 0,
        }
    }

    /// Create a time manager with the given fixed rate in Hz.
    pub fn with_fixed_rate(hz: f64) -> Self {
        let mut time = Self::new();
        time.set_fixed_rate(hz);
        time
    }

    /// Sample the wall clock at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Feed an explicit frame duration (headless or scripted loops).
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.accumulator += delta;
        self.steps_this_frame = 0;

        let cap = self.fixed_timestep * MAX_STEPS_PER_FRAME;
        if self.accumulator > cap {
            log::debug!(
                "frame of {:?} exceeds catch-up cap, dropping {:?}",
                delta,
                self.accumulator - cap
            );
            self.accumulator = cap;
        }
    }

    /// Check if a fixed tick should run and consume its time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep && self.steps_this_frame < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.fixed_timestep;
            self.elapsed += self.fixed_timestep;
            self.tick_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Get the last frame delta in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total simulated time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the number of fixed ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz.max(1.0));
    }
}
