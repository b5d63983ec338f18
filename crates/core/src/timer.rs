//! Frame timing.
//!
//! Simulation code never reads a process-wide clock. Each frame produces a
//! [`FrameTime`] value that is passed explicitly into whatever updates the
//! scene (animation curves, controllers, physics steps).

use std::time::{Duration, Instant};

/// Timing information for a single simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub delta_secs: f32,
    /// Seconds since the first frame.
    pub elapsed_secs: f32,
    /// Zero-based frame counter.
    pub frame: u64,
}

impl FrameTime {
    /// Build the timing of frame `frame` for a fixed step of `delta_secs`.
    ///
    /// Useful for deterministic stepping in tests and headless runs.
    pub fn fixed(frame: u64, delta_secs: f32) -> Self {
        Self {
            delta_secs,
            elapsed_secs: delta_secs * frame as f32,
            frame,
        }
    }
}

/// High-resolution timer for measuring elapsed time.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    frame: u64,
}

impl Timer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frame: 0,
        }
    }

    /// Get the total elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in seconds since the timer was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Get the time elapsed since the last call to `tick()`.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta
    }

    /// Advance one frame and return its timing.
    pub fn next_frame(&mut self) -> FrameTime {
        let delta_secs = self.tick().as_secs_f32();
        let time = FrameTime {
            delta_secs,
            elapsed_secs: (self.last_tick - self.start).as_secs_f32(),
            frame: self.frame,
        };
        self.frame += 1;
        time
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
