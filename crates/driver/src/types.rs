use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timeline::LoopTimeline;

/// Normalised RGB triple, every channel in `[0, 1]`.
pub type ColorVector = [f32; 3];

/// Accent colour used when the component is configured without one.
pub const DEFAULT_MAIN_COLOR: &str = "#4facfe";

/// Speed multiplier used when the component is configured without one.
pub const DEFAULT_SPEED: f32 = 5.0;

/// Interval between ticker callbacks when the driver owns its clock thread.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Drawable area reported by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Size assumed when the host cannot report its screen size up front.
    pub const FALLBACK: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    /// Returns `None` for sizes a shader cannot divide by: non-positive,
    /// NaN or infinite dimensions.
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let usable = |value: f32| value.is_finite() && value > 0.0;
        if usable(width) && usable(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }

    pub fn as_array(&self) -> [f32; 2] {
        [self.width, self.height]
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// What `set_color` does with a colour that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFailurePolicy {
    /// Install the fixed fallback colour.
    #[default]
    Fallback,
    /// Keep the last successfully resolved colour.
    #[serde(alias = "retain-previous")]
    Retain,
}

/// Snapshot of every uniform handed to the shader stage for one frame.
///
/// Bundles are rebuilt as a whole whenever an input changes, so a reader
/// always sees values from a single update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UniformBundle {
    /// Looping animation phase.
    #[serde(rename = "iTime")]
    pub time: f64,
    /// Accent colour.
    #[serde(rename = "iMainColor")]
    pub main_color: ColorVector,
    /// Viewport size in the surface's units.
    #[serde(rename = "iResolution")]
    pub resolution: [f32; 2],
    /// Multiplier the shaders apply to `time`.
    #[serde(rename = "iSpeed")]
    pub speed: f32,
}

impl UniformBundle {
    /// The effective motion term the programs scale their animation by.
    pub fn motion(&self) -> f64 {
        self.time * f64::from(self.speed)
    }
}

/// Start-up configuration for a [`UniformDriver`](crate::UniformDriver).
#[derive(Debug, Clone, PartialEq)]
pub struct DriverOptions {
    /// Initial resolution, normally the host's screen size, so the first
    /// frame is never zero-sized.
    pub viewport: Viewport,
    pub speed: f32,
    pub main_color: String,
    pub color_failure: ColorFailurePolicy,
    /// Shape of the looping phase.
    pub timeline: LoopTimeline,
    /// `None` leaves ticking to the host via `tick`/`tick_at`.
    pub tick_interval: Option<Duration>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            speed: DEFAULT_SPEED,
            main_color: DEFAULT_MAIN_COLOR.to_string(),
            color_failure: ColorFailurePolicy::default(),
            timeline: LoopTimeline::default(),
            tick_interval: Some(DEFAULT_TICK_INTERVAL),
        }
    }
}
