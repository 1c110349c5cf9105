use std::time::Duration;

/// Length of one pass from 0 to the phase bound.
pub const DEFAULT_LOOP_DURATION: Duration = Duration::from_secs(500);

/// Value the phase wraps at.
pub const DEFAULT_PHASE_BOUND: f64 = 10_000.0;

/// Linear, non-reversing loop from `0` to `bound` over `duration`.
///
/// The phase restarts at 0 on every wrap, so it always lies in `[0, bound)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopTimeline {
    duration: Duration,
    bound: f64,
}

impl LoopTimeline {
    pub fn new(duration: Duration, bound: f64) -> Option<Self> {
        if duration.is_zero() || !bound.is_finite() || bound <= 0.0 {
            None
        } else {
            Some(Self { duration, bound })
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Phase units advanced per second of wall-clock time.
    pub fn rate(&self) -> f64 {
        self.bound / self.duration.as_secs_f64()
    }

    pub fn phase_at(&self, elapsed: Duration) -> f64 {
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).fract();
        progress * self.bound
    }
}

impl Default for LoopTimeline {
    fn default() -> Self {
        Self {
            duration: DEFAULT_LOOP_DURATION,
            bound: DEFAULT_PHASE_BOUND,
        }
    }
}
