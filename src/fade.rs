// Fade animator: maps elapsed time to a layered-window alpha.
//
// Pure arithmetic on durations. The engine owns the phase start instant and
// feeds `Instant::now()` on each tick, so sleep/resume only shows up as a
// larger elapsed value on the next tick.

use std::time::{Duration, Instant};

/// Repeating tick period while a fade is in progress.
pub const FADE_TICK: Duration = Duration::from_millis(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

/// One sample of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeFrame {
    pub alpha: u8,
    /// Elapsed has reached the duration; `alpha` is the exact end value.
    pub done: bool,
}

/// Alpha for `elapsed` into a fade of `duration` toward/away from `target`.
///
/// A zero duration completes immediately.
pub fn fade_alpha(
    direction: FadeDirection,
    target: u8,
    elapsed: Duration,
    duration: Duration,
) -> FadeFrame {
    if duration.is_zero() || elapsed >= duration {
        let alpha = match direction {
            FadeDirection::In => target,
            FadeDirection::Out => 0,
        };
        return FadeFrame { alpha, done: true };
    }

    let t = (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
    let progress = match direction {
        FadeDirection::In => t,
        FadeDirection::Out => 1.0 - t,
    };
    let alpha = (progress * f64::from(target)).round().clamp(0.0, 255.0) as u8;
    FadeFrame { alpha, done: false }
}

/// A running fade phase.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    direction: FadeDirection,
    target: u8,
    started: Instant,
    duration: Duration,
}

impl Fade {
    pub fn new(direction: FadeDirection, target: u8, started: Instant, duration: Duration) -> Self {
        Self {
            direction,
            target,
            started,
            duration,
        }
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    pub fn sample(&self, now: Instant) -> FadeFrame {
        let elapsed = now.saturating_duration_since(self.started);
        fade_alpha(self.direction, self.target, elapsed, self.duration)
    }
}
