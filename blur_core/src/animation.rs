//! Radius ramps as an explicit state machine, driven by whatever cadence
//! the caller uses (typically the refresh scheduler).

use std::time::Duration;

/// Linear interpolation from a starting radius to a target radius over a
/// fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusAnimation {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
}

impl RadiusAnimation {
    /// Starts an animation from `from` to `to` over `duration`. A zero
    /// duration jumps straight to the target.
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self { from, to, duration, elapsed: Duration::ZERO }
    }

    /// Advances by `dt` and returns the current radius. Saturates at the
    /// target; ticking a finished animation keeps returning it.
    pub fn tick(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.current()
    }

    /// Interpolated radius at the current progress.
    pub fn current(&self) -> f32 {
        self.from + (self.to - self.from) * self.progress()
    }

    /// Completed fraction in `0..=1`.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f32() / self.duration.as_secs_f32()
        }
    }

    /// Whether the target radius has been reached.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
