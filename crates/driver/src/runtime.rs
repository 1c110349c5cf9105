use std::time::Instant;

use crate::timeline::LoopTimeline;

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Restarts the source so the next sample begins at phase 0.
    fn reset(&mut self, now: Instant);
    /// Looping phase handed to `iTime` for the frame drawn at `now`.
    fn phase_at(&self, now: Instant) -> f64;
}

/// Time source backed by the monotonic clock, folded through a
/// [`LoopTimeline`].
#[derive(Debug, Clone, Copy)]
pub struct LoopingTimeSource {
    origin: Instant,
    timeline: LoopTimeline,
}

impl LoopingTimeSource {
    pub fn new(timeline: LoopTimeline) -> Self {
        Self {
            origin: Instant::now(),
            timeline,
        }
    }
}

impl Default for LoopingTimeSource {
    fn default() -> Self {
        Self::new(LoopTimeline::default())
    }
}

impl TimeSource for LoopingTimeSource {
    fn reset(&mut self, now: Instant) {
        self.origin = now;
    }

    fn phase_at(&self, now: Instant) -> f64 {
        self.timeline
            .phase_at(now.saturating_duration_since(self.origin))
    }
}

/// Time source that always reports a fixed phase.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    phase: f64,
}

impl FixedTimeSource {
    pub fn new(phase: f64) -> Self {
        Self { phase }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self, _now: Instant) {}

    fn phase_at(&self, _now: Instant) -> f64 {
        self.phase
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn looping_source_measures_from_reset() {
        let mut source = LoopingTimeSource::default();
        let origin = Instant::now();
        source.reset(origin);

        assert!((source.phase_at(origin + Duration::from_secs(10)) - 200.0).abs() < 1e-9);
        assert!((source.phase_at(origin + Duration::from_secs(20)) - 400.0).abs() < 1e-9);

        source.reset(origin + Duration::from_secs(20));
        assert_eq!(source.phase_at(origin + Duration::from_secs(20)), 0.0);
    }

    #[test]
    fn looping_source_clamps_samples_before_origin() {
        let mut source = LoopingTimeSource::default();
        let origin = Instant::now() + Duration::from_secs(5);
        source.reset(origin);
        assert_eq!(source.phase_at(origin - Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn fixed_source_never_moves() {
        let mut source = FixedTimeSource::new(42.0);
        let now = Instant::now();
        assert_eq!(source.phase_at(now), 42.0);
        source.reset(now);
        assert_eq!(source.phase_at(now + Duration::from_secs(60)), 42.0);
    }
}
