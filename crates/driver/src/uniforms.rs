use bytemuck::{Pod, Zeroable};

use crate::types::UniformBundle;

/// std140 image of a [`UniformBundle`] for hosts that upload a uniform
/// buffer.
///
/// Field order and padding must match the `AmbientParams` block emitted by
/// `shaders::wrap_glsl`: `iResolution` at 0, `iTime` at 8, `iSpeed` at 12 and
/// `iMainColor` at 16, for 32 bytes in total.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub i_resolution: [f32; 2],
    pub i_time: f32,
    pub i_speed: f32,
    pub i_main_color: [f32; 3],
    pub i_padding0: f32,
}

impl ShaderUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl From<&UniformBundle> for ShaderUniforms {
    fn from(bundle: &UniformBundle) -> Self {
        Self {
            i_resolution: bundle.resolution,
            // The phase stays below the loop bound, well inside f32 precision.
            i_time: bundle.time as f32,
            i_speed: bundle.speed,
            i_main_color: bundle.main_color,
            i_padding0: 0.0,
        }
    }
}
