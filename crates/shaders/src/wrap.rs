use crate::program::{parse_uniform_line, ShaderProgram, UNIFORM_CONTRACT};

/// Produces a self-contained GLSL 450 fragment shader from a built-in program.
///
/// Steps performed:
///
/// 1. Strip the program's own declarations of the contract uniforms so the
///    uniform block in [`HEADER`] can provide them. Other uniforms are kept.
/// 2. Rewrite SkSL `half` types to their GLSL `float`/`vec` equivalents and
///    rename the entry point to `ambient_main`.
/// 3. Append [`FOOTER`] which calls `ambient_main` with the fragment
///    coordinate and writes `outColor`.
pub fn wrap_glsl(program: &ShaderProgram) -> String {
    let mut body = String::new();
    for line in program.source().lines() {
        let is_contract_uniform = parse_uniform_line(line).is_some_and(|uniform| {
            UNIFORM_CONTRACT
                .iter()
                .any(|(name, _)| *name == uniform.name)
        });
        if is_contract_uniform {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }

    let body = rewrite_half_types(&body).replace("vec4 main(", "vec4 ambient_main(");

    format!("{HEADER}\n#line 1\n{body}{FOOTER}")
}

/// Replaces whole `half`, `half2`, `half3` and `half4` tokens.
fn rewrite_half_types(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut token = String::new();
    for ch in source.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            token.push(ch);
            continue;
        }
        flush_token(&mut out, &mut token);
        out.push(ch);
    }
    flush_token(&mut out, &mut token);
    out
}

fn flush_token(out: &mut String, token: &mut String) {
    out.push_str(match token.as_str() {
        "half" => "float",
        "half2" => "vec2",
        "half3" => "vec3",
        "half4" => "vec4",
        other => other,
    });
    token.clear();
}

/// GLSL prologue injected ahead of every program.
///
/// The block layout must match `ShaderUniforms` in the driver crate:
/// `iResolution` at 0, `iTime` at 8, `iSpeed` at 12, `iMainColor` at 16.
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform AmbientParams {
    vec2 _iResolution;
    float _iTime;
    float _iSpeed;
    vec3 _iMainColor;
} ubo;

#define iResolution ubo._iResolution
#define iTime ubo._iTime
#define iSpeed ubo._iSpeed
#define iMainColor ubo._iMainColor
";

/// Vulkan-style GLSL already has a top-left `gl_FragCoord` origin, which is
/// what the programs expect.
const FOOTER: &str = r"void main() {
    outColor = ambient_main(gl_FragCoord.xy);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnimationVariant, ShaderRegistry};

    #[test]
    fn wrap_strips_contract_uniforms() {
        let registry = ShaderRegistry::builtin();
        let wrapped = wrap_glsl(registry.program(AnimationVariant::Mesh));
        assert!(!wrapped.contains("uniform float iTime;"));
        assert!(!wrapped.contains("uniform vec3 iMainColor;"));
        assert!(wrapped.contains("uniform AmbientParams"));
        assert!(wrapped.contains("#define iSpeed ubo._iSpeed"));
    }

    #[test]
    fn wrap_renames_entry_point_and_half_types() {
        let registry = ShaderRegistry::builtin();
        for program in registry.iter() {
            let wrapped = wrap_glsl(program);
            assert!(wrapped.contains("vec4 ambient_main(vec2 fragCoord)"));
            assert!(wrapped.contains("outColor = ambient_main(gl_FragCoord.xy);"));
            assert!(!wrapped.contains("half4"), "{}", program.variant());
        }
    }

    #[test]
    fn wrap_keeps_non_contract_uniforms() {
        let program = ShaderProgram::new(
            AnimationVariant::Fluid,
            "uniform float iTime;\nuniform float iTimeScale;\nhalf4 main(vec2 fragCoord) {\n    half glow = 0.5;\n    half halfway = glow;\n    return half4(halfway);\n}\n",
        );
        let wrapped = wrap_glsl(&program);
        assert!(!wrapped.contains("uniform float iTime;"));
        assert!(wrapped.contains("uniform float iTimeScale;"));
        assert!(wrapped.contains("float glow = 0.5;"));
        assert!(wrapped.contains("float halfway = glow;"));
        assert!(wrapped.contains("return vec4(halfway);"));
        assert!(wrapped.contains("vec4 ambient_main(vec2 fragCoord)"));
    }

    #[test]
    fn wrap_keeps_helper_functions() {
        let registry = ShaderRegistry::builtin();
        let wrapped = wrap_glsl(registry.program(AnimationVariant::Ripple));
        assert!(wrapped.contains("float hash21(vec2 p)"));
        assert!(wrapped.starts_with("#version 450"));
    }
}
