use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ambientbg",
    author,
    version,
    about = "Ambient background uniform driver",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration file; defaults to `ambientbg.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Animation variant (fluid, mesh, waves, aurora, colorful, ripple).
    #[arg(long, value_name = "NAME")]
    pub variant: Option<String>,

    /// Speed multiplier; 0 freezes motion, negative values reverse it.
    #[arg(long, value_name = "FACTOR", allow_hyphen_values = true)]
    pub speed: Option<f32>,

    /// Accent color (`#rrggbb`, `rgb(r, g, b)`, a CSS name, or `[r, g, b]`).
    #[arg(long, value_name = "COLOR")]
    pub color: Option<String>,

    /// Screen size to assume before the first layout report (e.g. `390x844`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(f32, f32)>,

    /// Layout size reported after the first frame, simulating a resize.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub resize: Option<(f32, f32)>,

    /// Number of uniform bundles to emit before stopping.
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    pub frames: u32,

    /// Rate at which bundles are emitted.
    #[arg(long, value_name = "FPS", default_value_t = 60.0, value_parser = parse_fps)]
    pub fps: f32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in animation variants.
    Variants,
    /// Print the shader program for a variant.
    Shader(ShaderArgs),
    /// Resolve a color specification into the normalized shader vector.
    Color(ColorArgs),
    /// Inspect configuration locations and effective values.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ShaderArgs {
    /// Variant name; unknown names print the default variant.
    #[arg(value_name = "VARIANT")]
    pub variant: String,

    /// Print the GLSL 450 wrapping instead of the raw program.
    #[arg(long)]
    pub glsl: bool,
}

#[derive(Parser, Debug)]
pub struct ColorArgs {
    #[arg(value_name = "COLOR", allow_hyphen_values = true)]
    pub spec: String,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration directory and file.
    Where,
    /// Print the effective configuration as TOML.
    Show {
        /// Configuration file to read instead of the default location.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(f32, f32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err("size dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

const MIN_FPS: f32 = 0.001;
const MAX_FPS: f32 = 1000.0;

fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid fps '{value}'"))?;
    if !(MIN_FPS..=MAX_FPS).contains(&fps) {
        return Err(format!("fps must be between {MIN_FPS} and {MAX_FPS}"));
    }
    Ok(fps)
}
