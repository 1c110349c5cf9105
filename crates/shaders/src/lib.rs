//! Built-in shader programs for the ambient background, keyed by
//! [`AnimationVariant`].
//!
//! Every program is SkSL-style source embedded at compile time. Programs take
//! the same four uniforms (`iTime`, `iMainColor`, `iResolution`, `iSpeed`) and
//! return a colour per fragment from `fragCoord`. Hosts that compile GLSL can
//! run a program through [`wrap_glsl`] first.
//!
//! Lookups never fail: an unknown variant name resolves to
//! [`AnimationVariant::Mesh`].

mod program;
mod wrap;

pub use program::{DeclaredUniform, ShaderProgram, UNIFORM_CONTRACT};
pub use wrap::wrap_glsl;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VariantError {
    #[error("unknown animation variant '{0}'")]
    Unknown(String),
}

/// Shader variants shipped with the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationVariant {
    Fluid,
    #[default]
    Mesh,
    Waves,
    Aurora,
    Colorful,
    Ripple,
}

impl AnimationVariant {
    pub const ALL: [AnimationVariant; 6] = [
        AnimationVariant::Fluid,
        AnimationVariant::Mesh,
        AnimationVariant::Waves,
        AnimationVariant::Aurora,
        AnimationVariant::Colorful,
        AnimationVariant::Ripple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnimationVariant::Fluid => "fluid",
            AnimationVariant::Mesh => "mesh",
            AnimationVariant::Waves => "waves",
            AnimationVariant::Aurora => "aurora",
            AnimationVariant::Colorful => "colorful",
            AnimationVariant::Ripple => "ripple",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AnimationVariant::Fluid => "layered smoke flow",
            AnimationVariant::Mesh => "soft mesh-gradient light blobs",
            AnimationVariant::Waves => "silk-like rolling waves",
            AnimationVariant::Aurora => "slow hue-shifted aurora bands",
            AnimationVariant::Colorful => "mesh blobs with derived accent colours",
            AnimationVariant::Ripple => "drifting water ripples",
        }
    }

    /// Resolves a variant name, degrading to the default variant when the
    /// name is not recognised.
    pub fn from_name_or_default(name: &str) -> Self {
        match name.parse() {
            Ok(variant) => variant,
            Err(err) => {
                tracing::warn!(%err, fallback = %Self::default(), "falling back to default variant");
                Self::default()
            }
        }
    }
}

impl FromStr for AnimationVariant {
    type Err = VariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|variant| variant.name() == normalized)
            .ok_or_else(|| VariantError::Unknown(value.to_string()))
    }
}

impl fmt::Display for AnimationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed table of compiled-in programs.
#[derive(Debug, Clone)]
pub struct ShaderRegistry {
    programs: [ShaderProgram; 6],
}

impl ShaderRegistry {
    pub fn builtin() -> Self {
        Self {
            programs: [
                ShaderProgram::new(AnimationVariant::Fluid, include_str!("../programs/fluid.sksl")),
                ShaderProgram::new(AnimationVariant::Mesh, include_str!("../programs/mesh.sksl")),
                ShaderProgram::new(AnimationVariant::Waves, include_str!("../programs/waves.sksl")),
                ShaderProgram::new(
                    AnimationVariant::Aurora,
                    include_str!("../programs/aurora.sksl"),
                ),
                ShaderProgram::new(
                    AnimationVariant::Colorful,
                    include_str!("../programs/colorful.sksl"),
                ),
                ShaderProgram::new(
                    AnimationVariant::Ripple,
                    include_str!("../programs/ripple.sksl"),
                ),
            ],
        }
    }

    pub fn program(&self, variant: AnimationVariant) -> &ShaderProgram {
        // The table is laid out in declaration order of `AnimationVariant`.
        &self.programs[variant as usize]
    }

    /// Looks a program up by variant name; unknown names get the mesh program.
    pub fn lookup(&self, name: &str) -> &ShaderProgram {
        self.program(AnimationVariant::from_name_or_default(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShaderProgram> {
        self.programs.iter()
    }
}

impl Default for ShaderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
