//! Frame timing utilities

use std::time::{Duration, Instant};

/// Wall-clock frame timer used by hosts that drive the frame loop themselves
///
/// The scheduler never reads the clock; the host measures elapsed time here and
/// passes it to [`crate::ScriptingHost::run_frame`].
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the timer by one frame and return the elapsed seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.advance(now.duration_since(self.last_frame));
        self.last_frame = now;
        self.delta_time
    }

    /// Advance the timer by an explicit duration (fixed-step hosts and tests)
    pub fn advance(&mut self, elapsed: Duration) {
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
