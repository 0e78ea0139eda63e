//! Frame timing for the render/physics loop.

use std::time::{Duration, Instant};

/// Default cap on the simulation step (one 60 Hz tick).
pub const DEFAULT_MAX_STEP: f32 = 1.0 / 60.0;

/// Tracks wall-clock frame deltas.
#[derive(Debug)]
pub struct Time {
    /// Time when the loop started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Sample the wall clock at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
        self.elapsed = now - self.start_time;
    }

    /// Advance by an explicit delta. `update` goes through here; tests call it directly.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (from the last frame).
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

/// Clamp a frame delta into `[0, max_step]`. Negative or NaN deltas become zero.
/// The physics world applies this to every step it takes.
pub fn capped_step(delta: f32, max_step: f32) -> f32 {
    if delta.is_nan() || delta <= 0.0 {
        0.0
    } else {
        delta.min(max_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_step_never_exceeds_cap() {
        let mut time = Time::new();
        for ms in [0u64, 1, 8, 16, 17, 33, 100, 250, 5000] {
            time.advance(Duration::from_millis(ms));
            let step = capped_step(time.delta_seconds(), DEFAULT_MAX_STEP);
            assert!((0.0..=DEFAULT_MAX_STEP).contains(&step));
        }
    }

    #[test]
    fn short_frames_pass_through_uncapped() {
        let mut time = Time::default();
        time.advance(Duration::from_millis(5));
        assert!((capped_step(time.delta_seconds(), DEFAULT_MAX_STEP) - 0.005).abs() < 1e-6);
    }

    #[test]
    fn capped_step_rejects_nan_and_negative() {
        assert_eq!(capped_step(f32::NAN, 0.1), 0.0);
        assert_eq!(capped_step(-1.0, 0.1), 0.0);
        assert_eq!(capped_step(3.0, 0.1), 0.1);
    }

    #[test]
    fn advance_accumulates_elapsed_and_frames() {
        let mut time = Time::default();
        time.advance(Duration::from_millis(250));
        time.advance(Duration::from_millis(250));
        assert_eq!(time.frame_count(), 2);
        assert!((time.elapsed_seconds() - 0.5).abs() < 1e-6);
    }
}
