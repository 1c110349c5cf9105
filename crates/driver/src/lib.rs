//! Uniform driver for the ambient background shaders.
//!
//! The driver owns the four inputs every background program reads and folds
//! them into a [`UniformBundle`] whenever one of them changes:
//!
//! ```text
//!   host layout ──▶ report_viewport_size ─┐
//!   set_color ──▶ color::resolve_color ───┤
//!   set_speed ────────────────────────────┼─▶ DriverState::recompute ─▶ UniformBundle
//!   Ticker / tick_at ──▶ TimeSource ──────┘                               │
//!                                                     current_uniforms() ◀─┘
//! ```
//!
//! All inputs live behind a single mutex and the bundle is rebuilt under that
//! lock, so the ticker thread and the host thread never observe a bundle that
//! mixes two updates. Bad input never surfaces as an error: unusable viewport
//! sizes are ignored and unparsable colours degrade to a fallback.

pub mod color;
mod runtime;
mod ticker;
mod timeline;
mod types;
mod uniforms;

pub use color::{ColorError, ParsedColor, FALLBACK_COLOR};
pub use runtime::{BoxedTimeSource, FixedTimeSource, LoopingTimeSource, TimeSource};
pub use timeline::{LoopTimeline, DEFAULT_LOOP_DURATION, DEFAULT_PHASE_BOUND};
pub use types::{
    ColorFailurePolicy, ColorVector, DriverOptions, UniformBundle, Viewport, DEFAULT_MAIN_COLOR,
    DEFAULT_SPEED, DEFAULT_TICK_INTERVAL,
};
pub use uniforms::ShaderUniforms;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use ticker::Ticker;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to spawn animation ticker: {0}")]
    Spawn(#[from] std::io::Error),
}

struct DriverState {
    source: BoxedTimeSource,
    running: bool,
    time: f64,
    viewport: Viewport,
    color_spec: String,
    color: ColorVector,
    color_failure: ColorFailurePolicy,
    color_failures: u64,
    speed: f32,
    bundle: UniformBundle,
}

impl DriverState {
    fn recompute(&mut self) {
        self.bundle = UniformBundle {
            time: self.time,
            main_color: self.color,
            resolution: self.viewport.as_array(),
            speed: self.speed,
        };
    }

    fn advance(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        self.time = self.source.phase_at(now);
        self.recompute();
    }
}

/// Owns the animation clock and the derived shader uniforms for one mounted
/// background.
pub struct UniformDriver {
    shared: Arc<Mutex<DriverState>>,
    ticker: Option<Ticker>,
    tick_interval: Option<Duration>,
}

impl UniformDriver {
    /// Builds a stopped driver whose clock loops along `options.timeline`.
    pub fn new(options: DriverOptions) -> Self {
        let source = Box::new(LoopingTimeSource::new(options.timeline));
        Self::with_time_source(options, source)
    }

    /// Builds a stopped driver around a caller-provided time source.
    pub fn with_time_source(options: DriverOptions, source: BoxedTimeSource) -> Self {
        let mut color_failures = 0;
        let color = color::resolve_color_with(&options.main_color, |err| {
            color_failures += 1;
            tracing::warn!(spec = %options.main_color, error = %err, "color parsing failed; using fallback color");
        });
        let viewport = Viewport::new(options.viewport.width, options.viewport.height)
            .unwrap_or(Viewport::FALLBACK);
        let speed = if options.speed.is_finite() {
            options.speed
        } else {
            tracing::warn!(speed = options.speed, "ignoring non-finite initial speed");
            DEFAULT_SPEED
        };

        let state = DriverState {
            source,
            running: false,
            time: 0.0,
            viewport,
            color_spec: options.main_color,
            color,
            color_failure: options.color_failure,
            color_failures,
            speed,
            bundle: UniformBundle {
                time: 0.0,
                main_color: color,
                resolution: viewport.as_array(),
                speed,
            },
        };

        Self {
            shared: Arc::new(Mutex::new(state)),
            ticker: None,
            // A zero interval would spin the ticker; treat it as host-driven.
            tick_interval: options.tick_interval.filter(|interval| !interval.is_zero()),
        }
    }

    /// Starts (or restarts) the looping clock from phase 0.
    ///
    /// When the driver was built with a tick interval a background ticker is
    /// spawned; otherwise the host advances the clock through [`tick`].
    ///
    /// [`tick`]: UniformDriver::tick
    pub fn start(&mut self) -> Result<(), DriverError> {
        self.stop();

        let now = Instant::now();
        {
            let mut state = lock(&self.shared);
            state.source.reset(now);
            state.time = 0.0;
            state.running = true;
            state.recompute();
        }

        if let Some(interval) = self.tick_interval {
            let shared = Arc::clone(&self.shared);
            let ticker = Ticker::spawn("ambient-clock", interval, move |at| {
                lock(&shared).advance(at);
            });
            match ticker {
                Ok(ticker) => self.ticker = Some(ticker),
                Err(err) => {
                    lock(&self.shared).running = false;
                    return Err(DriverError::Spawn(err));
                }
            }
        }

        tracing::debug!(interval = ?self.tick_interval, "animation clock started");
        Ok(())
    }

    /// Cancels the clock. The time uniform keeps its last value and no tick
    /// runs after this returns.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.shutdown();
        }
        let mut state = lock(&self.shared);
        if state.running {
            state.running = false;
            tracing::debug!(time = state.time, "animation clock stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).running
    }

    /// Advances the time uniform to the current instant.
    pub fn tick(&self) {
        self.tick_at(Instant::now());
    }

    /// Advances the time uniform to `now`; a no-op while stopped.
    pub fn tick_at(&self, now: Instant) {
        lock(&self.shared).advance(now);
    }

    /// Updates the resolution uniform. Sizes that are not strictly positive
    /// and finite are ignored so transient layout passes cannot zero it.
    pub fn report_viewport_size(&self, width: f32, height: f32) {
        let Some(viewport) = Viewport::new(width, height) else {
            tracing::trace!(width, height, "ignoring unusable viewport size");
            return;
        };
        let mut state = lock(&self.shared);
        if state.viewport != viewport {
            state.viewport = viewport;
            state.recompute();
        }
    }

    /// Resolves `spec` into the colour uniform. Failures never propagate;
    /// the configured [`ColorFailurePolicy`] picks the substitute.
    pub fn set_color(&self, spec: &str) {
        let mut state = lock(&self.shared);
        if state.color_spec == spec {
            return;
        }
        state.color_spec = spec.to_string();

        let mut failed = false;
        let color = match state.color_failure {
            ColorFailurePolicy::Fallback => color::resolve_color_with(spec, |err| {
                failed = true;
                tracing::warn!(spec, error = %err, "color parsing failed; using fallback color");
            }),
            ColorFailurePolicy::Retain => match color::try_resolve_color(spec) {
                Ok(color) => color,
                Err(err) => {
                    failed = true;
                    tracing::warn!(spec, error = %err, "color parsing failed; keeping previous color");
                    state.color
                }
            },
        };

        if failed {
            state.color_failures += 1;
        }
        state.color = color;
        state.recompute();
    }

    /// Sets the speed multiplier. Zero freezes apparent motion and negative
    /// values reverse it; the clock itself keeps running either way.
    pub fn set_speed(&self, speed: f32) {
        if !speed.is_finite() {
            tracing::warn!(speed, "ignoring non-finite speed");
            return;
        }
        let mut state = lock(&self.shared);
        state.speed = speed;
        state.recompute();
    }

    pub fn current_uniforms(&self) -> UniformBundle {
        lock(&self.shared).bundle
    }

    /// The latest bundle laid out for a std140 uniform buffer.
    pub fn current_block(&self) -> ShaderUniforms {
        ShaderUniforms::from(&self.current_uniforms())
    }

    /// Number of colour specifications that failed to parse so far.
    pub fn color_failures(&self) -> u64 {
        lock(&self.shared).color_failures
    }
}

impl Drop for UniformDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(shared: &Mutex<DriverState>) -> MutexGuard<'_, DriverState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
