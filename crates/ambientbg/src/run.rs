use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use bgconfig::BackgroundConfig;
use driver::{UniformBundle, UniformDriver, Viewport};
use serde::Serialize;
use shaders::{AnimationVariant, ShaderRegistry};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

/// One line of the frame stream written to stdout.
#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: u32,
    variant: AnimationVariant,
    #[serde(flatten)]
    uniforms: UniformBundle,
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config
        .validate()
        .context("invalid configuration after applying command-line overrides")?;

    let registry = ShaderRegistry::builtin();
    let variant = config.variant();
    let program = registry.program(variant);
    for issue in program.validate() {
        tracing::warn!(variant = %variant, "{issue}");
    }

    let screen = args
        .size
        .and_then(|(width, height)| Viewport::new(width, height));
    let options = config.driver_options(screen);
    let host_driven = options.tick_interval.is_none();
    tracing::info!(
        variant = %variant,
        speed = options.speed,
        color = %options.main_color,
        viewport = ?options.viewport.as_array(),
        tick_interval = ?options.tick_interval,
        loop_duration = ?options.timeline.duration(),
        phase_rate = options.timeline.rate(),
        "starting ambient background"
    );
    if args.resize.is_some() && args.frames < 2 {
        tracing::warn!(
            frames = args.frames,
            "--resize applies after the first frame; pass --frames 2 or more to see it"
        );
    }

    let frame_interval = Duration::try_from_secs_f32(1.0 / args.fps)
        .with_context(|| format!("frame rate {} is out of range", args.fps))?;
    let mut driver = UniformDriver::new(options);
    driver.start().context("failed to start uniform clock")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for frame in 0..args.frames {
        if frame > 0 {
            thread::sleep(frame_interval);
        }
        if frame == 1 {
            if let Some((width, height)) = args.resize {
                driver.report_viewport_size(width, height);
            }
        }
        if host_driven {
            driver.tick();
        }

        let record = FrameRecord {
            frame,
            variant,
            uniforms: driver.current_uniforms(),
        };
        serde_json::to_writer(&mut out, &record).context("failed to encode frame")?;
        writeln!(out).context("failed to write frame")?;
    }
    out.flush().context("failed to flush frame stream")?;

    driver.stop();
    let failures = driver.color_failures();
    if failures > 0 {
        tracing::debug!(failures, "color specifications fell back during run");
    }
    Ok(())
}

/// Loads `explicit`, else the discovered config file if it exists, else the
/// built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<BackgroundConfig> {
    if let Some(path) = explicit {
        return BackgroundConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()));
    }

    let paths = AppPaths::discover()?;
    let path = paths.config_file();
    if path.is_file() {
        tracing::debug!(path = %path.display(), "loading configuration");
        BackgroundConfig::load(&path).with_context(|| format!("failed to load {}", path.display()))
    } else {
        tracing::debug!(path = %path.display(), "no configuration file; using defaults");
        Ok(BackgroundConfig::default())
    }
}

fn apply_overrides(config: &mut BackgroundConfig, args: &RunArgs) {
    if let Some(variant) = &args.variant {
        config.variant = variant.clone();
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    if let Some(color) = &args.color {
        config.main_color = color.clone();
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn overrides_replace_config_values() {
        let cli = crate::cli::Cli::try_parse_from([
            "ambientbg",
            "--variant",
            "aurora",
            "--speed",
            "0",
            "--color",
            "teal",
        ])
        .unwrap();
        let mut config = BackgroundConfig::default();
        apply_overrides(&mut config, &cli.run);

        assert_eq!(config.variant(), AnimationVariant::Aurora);
        assert_eq!(config.speed, 0.0);
        assert_eq!(config.main_color, "teal");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn absent_overrides_keep_config() {
        let cli = crate::cli::Cli::try_parse_from(["ambientbg"]).unwrap();
        let mut config = BackgroundConfig::default();
        apply_overrides(&mut config, &cli.run);
        assert_eq!(config, BackgroundConfig::default());
    }

    #[test]
    fn frame_record_flattens_uniforms() {
        let record = FrameRecord {
            frame: 2,
            variant: AnimationVariant::Waves,
            uniforms: UniformBundle {
                time: 1.5,
                main_color: [0.25, 0.5, 1.0],
                resolution: [390.0, 844.0],
                speed: 5.0,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["frame"], 2);
        assert_eq!(json["variant"], "waves");
        assert_eq!(json["iTime"], 1.5);
        assert_eq!(json["iResolution"][1], 844.0);
        assert_eq!(json["iSpeed"], 5.0);
    }
}
