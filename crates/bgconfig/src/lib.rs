use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use driver::{
    ColorFailurePolicy, DriverOptions, LoopTimeline, Viewport, DEFAULT_LOOP_DURATION,
    DEFAULT_MAIN_COLOR, DEFAULT_PHASE_BOUND, DEFAULT_SPEED, DEFAULT_TICK_INTERVAL,
};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use shaders::AnimationVariant;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Component configuration surface for one animated background.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackgroundConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Variant name; unknown names render the default variant.
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_main_color")]
    pub main_color: String,
    #[serde(default)]
    pub color_failure: ColorFailurePolicy,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClockConfig {
    #[serde(
        default = "default_loop_duration",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub loop_duration: Duration,
    #[serde(default = "default_phase_bound")]
    pub phase_bound: f64,
    /// Zero leaves ticking to the host.
    #[serde(
        default = "default_tick_interval",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub tick_interval: Duration,
}

/// Screen size to assume before the first layout report.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

fn default_version() -> u32 {
    1
}

fn default_variant() -> String {
    AnimationVariant::default().name().to_string()
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

fn default_main_color() -> String {
    DEFAULT_MAIN_COLOR.to_string()
}

fn default_loop_duration() -> Duration {
    DEFAULT_LOOP_DURATION
}

fn default_phase_bound() -> f64 {
    DEFAULT_PHASE_BOUND
}

fn default_tick_interval() -> Duration {
    DEFAULT_TICK_INTERVAL
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            loop_duration: default_loop_duration(),
            phase_bound: default_phase_bound(),
            tick_interval: default_tick_interval(),
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            variant: default_variant(),
            speed: default_speed(),
            main_color: default_main_color(),
            color_failure: ColorFailurePolicy::default(),
            clock: ClockConfig::default(),
            viewport: None,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v.trim())
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

impl BackgroundConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: BackgroundConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if !self.speed.is_finite() {
            return Err(ConfigError::Invalid("speed must be a finite number".into()));
        }

        if self.main_color.trim().is_empty() {
            return Err(ConfigError::Invalid("main_color must not be empty".into()));
        }

        if self.clock.loop_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "clock.loop_duration must be greater than zero".into(),
            ));
        }

        if !self.clock.phase_bound.is_finite() || self.clock.phase_bound <= 0.0 {
            return Err(ConfigError::Invalid(
                "clock.phase_bound must be a positive number".into(),
            ));
        }

        if let Some(viewport) = self.viewport {
            if Viewport::new(viewport.width, viewport.height).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "viewport {}x{} must have positive dimensions",
                    viewport.width, viewport.height
                )));
            }
        }

        Ok(())
    }

    pub fn variant(&self) -> AnimationVariant {
        AnimationVariant::from_name_or_default(&self.variant)
    }

    pub fn timeline(&self) -> LoopTimeline {
        LoopTimeline::new(self.clock.loop_duration, self.clock.phase_bound).unwrap_or_default()
    }

    pub fn tick_interval(&self) -> Option<Duration> {
        Some(self.clock.tick_interval).filter(|interval| !interval.is_zero())
    }

    /// Initial viewport, falling back to `screen` and then to
    /// [`Viewport::FALLBACK`].
    pub fn viewport(&self, screen: Option<Viewport>) -> Viewport {
        self.viewport
            .and_then(|viewport| Viewport::new(viewport.width, viewport.height))
            .or(screen)
            .unwrap_or(Viewport::FALLBACK)
    }

    pub fn driver_options(&self, screen: Option<Viewport>) -> DriverOptions {
        DriverOptions {
            viewport: self.viewport(screen),
            speed: self.speed,
            main_color: self.main_color.clone(),
            color_failure: self.color_failure,
            timeline: self.timeline(),
            tick_interval: self.tick_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1
variant = "ripple"
speed = 0.1
main_color = "#cd6879"
color_failure = "retain"

[clock]
loop_duration = "10m"
phase_bound = 20000
tick_interval = "33ms"

[viewport]
width = 390
height = 844
"##;

    #[test]
    fn parses_sample_config() {
        let config = BackgroundConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.variant(), AnimationVariant::Ripple);
        assert_eq!(config.speed, 0.1);
        assert_eq!(config.main_color, "#cd6879");
        assert_eq!(config.color_failure, ColorFailurePolicy::Retain);
        assert_eq!(config.clock.loop_duration, Duration::from_secs(600));
        assert_eq!(config.clock.phase_bound, 20_000.0);
        assert_eq!(config.tick_interval(), Some(Duration::from_millis(33)));
        assert_eq!(
            config.viewport(None),
            Viewport {
                width: 390.0,
                height: 844.0
            }
        );
    }

    #[test]
    fn empty_config_uses_component_defaults() {
        let config = BackgroundConfig::from_toml_str("").expect("parse config");
        assert_eq!(config, BackgroundConfig::default());
        assert_eq!(config.variant(), AnimationVariant::Mesh);
        assert_eq!(config.speed, 5.0);
        assert_eq!(config.main_color, "#4facfe");
        assert_eq!(config.timeline(), LoopTimeline::default());
        assert_eq!(config.viewport(None), Viewport::FALLBACK);
    }

    #[test]
    fn unknown_variant_is_not_an_error() {
        let config = BackgroundConfig::from_toml_str(r#"variant = "plasma""#).unwrap();
        assert_eq!(config.variant(), AnimationVariant::Mesh);
    }

    #[test]
    fn numeric_durations_are_seconds() {
        let config = BackgroundConfig::from_toml_str(
            r#"
[clock]
loop_duration = 90
tick_interval = 0.5
"#,
        )
        .unwrap();
        assert_eq!(config.clock.loop_duration, Duration::from_secs(90));
        assert_eq!(config.tick_interval(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn zero_tick_interval_hands_ticking_to_the_host() {
        let config = BackgroundConfig::from_toml_str("[clock]\ntick_interval = 0").unwrap();
        assert_eq!(config.tick_interval(), None);
        assert_eq!(config.driver_options(None).tick_interval, None);
    }

    #[test]
    fn rejects_invalid_values() {
        for input in [
            "version = 2",
            "main_color = \"  \"",
            "[clock]\nloop_duration = 0",
            "[clock]\nphase_bound = -1",
            "[viewport]\nwidth = 0\nheight = 10",
        ] {
            let err = BackgroundConfig::from_toml_str(input).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{input}: {err}");
        }
        assert!(matches!(
            BackgroundConfig::from_toml_str("[clock]\nloop_duration = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            BackgroundConfig::from_toml_str("[clock]\ntick_interval = -3"),
            Err(ConfigError::Parse(_))
        ));
        for overflowing in ["loop_duration = 1e30", "tick_interval = 1e30"] {
            assert!(matches!(
                BackgroundConfig::from_toml_str(&format!("[clock]\n{overflowing}")),
                Err(ConfigError::Parse(_))
            ));
        }
    }

    #[test]
    fn driver_options_prefer_configured_viewport() {
        let screen = Viewport::new(1080.0, 2400.0);
        let config = BackgroundConfig::default();
        assert_eq!(config.driver_options(screen).viewport, screen.unwrap());

        let configured = BackgroundConfig::from_toml_str(SAMPLE).unwrap();
        let options = configured.driver_options(screen);
        assert_eq!(options.viewport.as_array(), [390.0, 844.0]);
        assert_eq!(options.speed, 0.1);
        assert_eq!(options.color_failure, ColorFailurePolicy::Retain);
        assert_eq!(options.timeline.bound(), 20_000.0);
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = BackgroundConfig::from_toml_str(SAMPLE).unwrap();
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("loop_duration = \"10m\""));
        let reparsed = BackgroundConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn load_reports_missing_files() {
        let err = BackgroundConfig::load(Path::new("/nonexistent/ambientbg.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
