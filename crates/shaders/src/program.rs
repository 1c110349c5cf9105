//! Describes a single built-in shader program and the uniform contract every
//! program must honour, so hosts can check a program before handing it to an
//! external compiler.
//!
//! Types:
//!
//! - `ShaderProgram` pairs an `AnimationVariant` with its embedded source.
//! - `DeclaredUniform` is one `uniform <type> <name>;` line found in a source.
//!
//! Functions:
//!
//! - `ShaderProgram::declared_uniforms` scans top-level uniform declarations.
//! - `ShaderProgram::validate` returns human-readable issues instead of
//!   failing, mirroring how the render path degrades rather than aborts.
use crate::AnimationVariant;

/// Uniform names and GLSL types every program receives, in upload order.
pub const UNIFORM_CONTRACT: [(&str, &str); 4] = [
    ("iTime", "float"),
    ("iMainColor", "vec3"),
    ("iResolution", "vec2"),
    ("iSpeed", "float"),
];

const ENTRY_SIGNATURE: &str = "half4 main(vec2 fragCoord)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredUniform {
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ShaderProgram {
    variant: AnimationVariant,
    source: &'static str,
}

impl ShaderProgram {
    pub(crate) fn new(variant: AnimationVariant, source: &'static str) -> Self {
        Self { variant, source }
    }

    pub fn variant(&self) -> AnimationVariant {
        self.variant
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn declared_uniforms(&self) -> Vec<DeclaredUniform> {
        parse_uniforms(self.source)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let declared = self.declared_uniforms();

        for (name, ty) in UNIFORM_CONTRACT {
            match declared.iter().find(|uniform| uniform.name == name) {
                None => issues.push(format!("program '{}' does not declare {name}", self.variant)),
                Some(uniform) if uniform.ty != ty => issues.push(format!(
                    "program '{}' declares {name} as {} (expected {ty})",
                    self.variant, uniform.ty
                )),
                Some(_) => {}
            }
        }

        for uniform in &declared {
            if UNIFORM_CONTRACT
                .iter()
                .all(|(name, _)| *name != uniform.name)
            {
                issues.push(format!(
                    "program '{}' declares unexpected uniform {}",
                    self.variant, uniform.name
                ));
            }
        }

        if !self.source.contains(ENTRY_SIGNATURE) {
            issues.push(format!(
                "program '{}' is missing entry point `{ENTRY_SIGNATURE}`",
                self.variant
            ));
        }

        issues
    }
}

fn parse_uniforms(source: &str) -> Vec<DeclaredUniform> {
    source.lines().filter_map(parse_uniform_line).collect()
}

/// Parses a single `uniform <type> <name>;` line.
pub(crate) fn parse_uniform_line(line: &str) -> Option<DeclaredUniform> {
    let rest = line.trim_start().strip_prefix("uniform ")?;
    let declaration = rest.split(';').next()?;
    let mut parts = declaration.split_whitespace();
    let ty = parts.next()?;
    let name = parts.next()?;
    Some(DeclaredUniform {
        ty: ty.to_string(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShaderRegistry;

    #[test]
    fn builtin_programs_satisfy_the_uniform_contract() {
        let registry = ShaderRegistry::builtin();
        for program in registry.iter() {
            let issues = program.validate();
            assert!(issues.is_empty(), "{}: {issues:?}", program.variant());
        }
    }

    #[test]
    fn reports_missing_and_mistyped_uniforms() {
        let program = ShaderProgram::new(
            AnimationVariant::Waves,
            "uniform float iTime;\nuniform vec4 iMainColor;\nuniform float iMouse;\nhalf4 main(vec2 fragCoord) { return half4(1.0); }",
        );
        let issues = program.validate();
        assert!(issues.iter().any(|issue| issue.contains("iMainColor as vec4")));
        assert!(issues.iter().any(|issue| issue.contains("does not declare iResolution")));
        assert!(issues.iter().any(|issue| issue.contains("does not declare iSpeed")));
        assert!(issues.iter().any(|issue| issue.contains("unexpected uniform iMouse")));
    }

    #[test]
    fn reports_missing_entry_point() {
        let program = ShaderProgram::new(
            AnimationVariant::Fluid,
            "uniform float iTime;\nuniform vec3 iMainColor;\nuniform vec2 iResolution;\nuniform float iSpeed;\nvoid mainImage(out vec4 c, in vec2 p) {}",
        );
        let issues = program.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("entry point"));
    }

    #[test]
    fn parses_uniform_declarations_in_order() {
        let uniforms = parse_uniforms("  uniform vec2 iResolution;\nfloat x;\nuniform float iSpeed ;");
        assert_eq!(
            uniforms,
            vec![
                DeclaredUniform {
                    ty: "vec2".into(),
                    name: "iResolution".into()
                },
                DeclaredUniform {
                    ty: "float".into(),
                    name: "iSpeed".into()
                },
            ]
        );
    }
}
