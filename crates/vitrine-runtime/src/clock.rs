//! Frame clock

use std::time::Instant;

/// Longest frame the animation loop will advance by
pub const MAX_FRAME_SECS: f64 = 0.25;

/// Measures wall time between frames
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock and return the frame delta. Call once per frame.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return 0.0;
        }

        let elapsed = now.saturating_duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // Clamp so a stalled frame doesn't jump animations
        self.delta_time = elapsed.min(MAX_FRAME_SECS);
        self.total_time += self.delta_time;
        self.delta_time
    }
}
