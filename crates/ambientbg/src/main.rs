//! ambientbg drives the uniform clock behind the animated background
//! shaders and streams the resulting uniform bundles as JSON lines.
//!
//! Modules:
//!
//! - `cli` defines the clap surface: run flags plus the inspection
//!   subcommands.
//! - `paths` resolves where `ambientbg.toml` lives.
//! - `run` loads configuration, starts a `UniformDriver` and emits frames.

mod cli;
mod paths;
mod run;

use anyhow::{Context, Result};
use cli::{ColorArgs, Command, ConfigAction, ShaderArgs};
use driver::color::resolve_color;
use paths::AppPaths;
use shaders::{wrap_glsl, AnimationVariant, ShaderRegistry};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Variants) => run_variants(),
        Some(Command::Shader(args)) => run_shader(args),
        Some(Command::Color(args)) => run_color(args),
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action),
        None => run::run(cli.run),
    }
}

fn run_variants() -> Result<()> {
    let default = AnimationVariant::default();
    for variant in AnimationVariant::ALL {
        let marker = if variant == default { " (default)" } else { "" };
        println!("{:<9} {}{marker}", variant.name(), variant.description());
    }
    Ok(())
}

fn run_shader(args: ShaderArgs) -> Result<()> {
    let registry = ShaderRegistry::builtin();
    let program = registry.lookup(&args.variant);
    if args.glsl {
        print!("{}", wrap_glsl(program));
    } else {
        print!("{}", program.source());
    }
    Ok(())
}

fn run_color(args: ColorArgs) -> Result<()> {
    let [r, g, b] = resolve_color(&args.spec);
    println!("{r:.3} {g:.3} {b:.3}");
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Where => {
            let paths = AppPaths::discover()?;
            let file = paths.config_file();
            println!("Configuration:");
            println!("  directory:  {}", paths.config_dir().display());
            println!(
                "  file:       {} ({})",
                file.display(),
                if file.is_file() { "present" } else { "missing" }
            );
            Ok(())
        }
        ConfigAction::Show { config } => {
            let config = run::load_config(config.as_deref())?;
            let rendered = config
                .to_toml_string()
                .context("failed to render configuration")?;
            print!("{rendered}");
            Ok(())
        }
    }
}
