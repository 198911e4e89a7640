use meshview_common::ShaderVariant;
use meshview_render::AttributeBinding;
use std::path::{Path, PathBuf};

/// File name of the vertex stage inside a shader directory.
pub const VERTEX_FILE: &str = "viewer.vert.wgsl";

/// Entry points every shader pair must provide.
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Errors from loading or checking shader sources.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("vertex shader has no input `@location({location}) {name}`")]
    MissingAttribute { name: &'static str, location: u32 },
    #[error("fragment shader has no uniform field `{0}`")]
    MissingUniform(&'static str),
    #[error("{stage} shader has no entry point `{name}`")]
    MissingEntryPoint {
        stage: &'static str,
        name: &'static str,
    },
}

/// WGSL vertex stage shared by every effect variant.
pub const VERTEX_SHADER: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    world: mat4x4<f32>,
    camera: mat4x4<f32>,
    projection: mat4x4<f32>,
    inverse_transpose: mat4x4<f32>,
    effect: f32,
    time: f32,
    flat_lighting: u32,
    pad0: u32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) model_position: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let view_position = uniforms.camera * uniforms.world * uniforms.model
        * vec4<f32>(vertex.position, 1.0);
    let n = (uniforms.inverse_transpose * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.projection * view_position;
    out.view_position = view_position.xyz;
    out.view_normal = n / max(length(n), 1e-6);
    out.model_position = vertex.position;
    return out;
}
"#;

/// Uniform block, fragment inputs and lighting shared by the fragment
/// variants. `EFFECT_FIELD` is replaced with the variant's uniform name.
const FRAGMENT_PRELUDE: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    world: mat4x4<f32>,
    camera: mat4x4<f32>,
    projection: mat4x4<f32>,
    inverse_transpose: mat4x4<f32>,
    EFFECT_FIELD: f32,
    time: f32,
    flat_lighting: u32,
    pad0: u32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct FragmentInput {
    @builtin(position) frag_coord: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) model_position: vec3<f32>,
};

const BASE_COLOR: vec3<f32> = vec3<f32>(0.8, 0.8, 0.8);
const LIGHT_DIR: vec3<f32> = vec3<f32>(0.57735, 0.57735, 0.57735);

// Flat lighting takes the face normal from screen-space derivatives. Lines
// have no area, so a degenerate face normal falls back to +Y.
fn shade(in: FragmentInput) -> vec3<f32> {
    let face = cross(dpdx(in.view_position), dpdy(in.view_position));
    var diffuse = max(dot(in.view_normal, LIGHT_DIR), 0.0);
    if uniforms.flat_lighting != 0u {
        var normal = vec3<f32>(0.0, 1.0, 0.0);
        if length(face) > 1e-8 {
            normal = normalize(face);
        }
        diffuse = abs(dot(normal, LIGHT_DIR));
    }
    return BASE_COLOR * (0.3 + 0.7 * diffuse);
}
"#;

const GREEN_SHIFT_BODY: &str = r#"
@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    var color = shade(in);
    color.g = clamp(color.g + uniforms.green_shift, 0.0, 1.0);
    return vec4<f32>(color, 1.0);
}
"#;

const WAVY_BODY: &str = r#"
const TAU: f32 = 6.2831853;

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let phase = uniforms.time / 2000.0 * TAU;
    let wave = sin(in.model_position.y * uniforms.wave_size + phase);
    let color = shade(in) * (0.75 + 0.25 * wave);
    return vec4<f32>(color, 1.0);
}
"#;

const CROSS_BODY: &str = r#"
@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let cell = fract(in.frag_coord.xy / 24.0) - vec2<f32>(0.5, 0.5);
    let on_cross = select(0.0, 1.0, min(abs(cell.x), abs(cell.y)) < 0.06);
    let strength = clamp(uniforms.cross_intensity, 0.0, 1.0) * on_cross;
    let color = mix(shade(in), vec3<f32>(1.0, 0.2, 0.2), strength);
    return vec4<f32>(color, 1.0);
}
"#;

const NOISY_BODY: &str = r#"
fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let tile = floor(in.frag_coord.xy / max(uniforms.tile_size, 1.0));
    let seed = floor(uniforms.time / 250.0);
    let noise = hash(tile + vec2<f32>(seed, seed));
    let color = shade(in) * (0.6 + 0.4 * noise);
    return vec4<f32>(color, 1.0);
}
"#;

/// Built-in WGSL for a variant's fragment stage.
pub fn embedded_fragment(variant: ShaderVariant) -> String {
    let body = match variant {
        ShaderVariant::GreenShift => GREEN_SHIFT_BODY,
        ShaderVariant::Wavy => WAVY_BODY,
        ShaderVariant::Cross => CROSS_BODY,
        ShaderVariant::Noisy => NOISY_BODY,
    };
    let prelude = FRAGMENT_PRELUDE.replace("EFFECT_FIELD", variant.effect().uniform_name);
    prelude + body
}

/// Vertex and fragment WGSL for one variant.
#[derive(Debug, Clone)]
pub struct ShaderPair {
    pub variant: ShaderVariant,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderPair {
    pub fn embedded(variant: ShaderVariant) -> Self {
        Self {
            variant,
            vertex: VERTEX_SHADER.to_string(),
            fragment: embedded_fragment(variant),
        }
    }

    /// Read `viewer.vert.wgsl` and the variant's fragment file from `dir`.
    pub fn from_dir(variant: ShaderVariant, dir: &Path) -> Result<Self, ShaderError> {
        let vertex = read_source(&dir.join(VERTEX_FILE))?;
        let fragment = read_source(&dir.join(variant.effect().fragment_file))?;
        Ok(Self {
            variant,
            vertex,
            fragment,
        })
    }

    /// From `dir` when given, embedded sources otherwise.
    pub fn load(variant: ShaderVariant, dir: Option<&Path>) -> Result<Self, ShaderError> {
        let pair = match dir {
            Some(dir) => Self::from_dir(variant, dir)?,
            None => Self::embedded(variant),
        };
        tracing::info!(
            %variant,
            source = dir.map_or_else(|| "embedded".to_string(), |d| d.display().to_string()),
            "loaded shaders"
        );
        Ok(pair)
    }

    /// Resolve every named input the pipeline binds: vertex attributes,
    /// the effect uniform and both entry points.
    ///
    /// Attributes are looked up among the vertex entry point's inputs (its
    /// `@location` parameters and the fields of its struct parameters), and
    /// the effect uniform among the fields of the `var<uniform>` struct.
    /// Comments are ignored.
    pub fn validate(&self, attributes: &[AttributeBinding]) -> Result<(), ShaderError> {
        let vertex = compact(&self.vertex);
        let fragment = compact(&self.fragment);

        let Some(vertex_params) = entry_params(&vertex, VERTEX_ENTRY) else {
            return Err(ShaderError::MissingEntryPoint {
                stage: "vertex",
                name: VERTEX_ENTRY,
            });
        };
        if entry_params(&fragment, FRAGMENT_ENTRY).is_none() {
            return Err(ShaderError::MissingEntryPoint {
                stage: "fragment",
                name: FRAGMENT_ENTRY,
            });
        }

        let inputs = entry_inputs(&vertex, vertex_params);
        for attr in attributes {
            let wanted = format!("@location({}){}:", attr.location, attr.name);
            if !inputs.iter().any(|field| field.starts_with(&wanted)) {
                return Err(ShaderError::MissingAttribute {
                    name: attr.name,
                    location: attr.location,
                });
            }
        }

        let uniform = self.variant.effect().uniform_name;
        let wanted = format!("{uniform}:f32");
        let declared = uniform_fields(&fragment)
            .iter()
            .any(|field| strip_attributes(field) == wanted);
        if !declared {
            return Err(ShaderError::MissingUniform(uniform));
        }
        Ok(())
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Source with comments and all whitespace removed.
fn compact(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map_or("", |end| &after[end..]);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map_or("", |end| &after[end + 2..]);
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                if !c.is_whitespace() {
                    out.push(c);
                }
            }
            rest = chars.as_str();
        }
    }
    out
}

/// Parameter list of `fn name(...)`, or `None` when there is no such function.
fn entry_params<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let start = source.find(&format!("fn{name}("))? + name.len() + 3;
    let mut depth = 0usize;
    for (i, c) in source[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(&source[start..start + i]),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Comma-separated fields of `struct name { ... }`.
fn struct_fields<'a>(source: &'a str, name: &str) -> Vec<&'a str> {
    let open = format!("struct{name}{{");
    let Some(start) = source.find(&open).map(|i| i + open.len()) else {
        return Vec::new();
    };
    let body = source[start..]
        .find('}')
        .map_or(&source[start..], |end| &source[start..start + end]);
    body.split(',').filter(|f| !f.is_empty()).collect()
}

/// Every shader input an entry point receives: direct parameters plus the
/// fields of struct-typed parameters.
fn entry_inputs<'a>(source: &'a str, params: &'a str) -> Vec<&'a str> {
    let mut inputs = Vec::new();
    for param in params.split(',').filter(|p| !p.is_empty()) {
        if param.starts_with('@') {
            inputs.push(param);
        } else if let Some((_, ty)) = param.split_once(':') {
            inputs.extend(struct_fields(source, ty));
        }
    }
    inputs
}

/// Fields of the struct bound as `var<uniform>`.
fn uniform_fields(source: &str) -> Vec<&str> {
    let decl = "var<uniform>";
    let Some(start) = source.find(decl).map(|i| i + decl.len()) else {
        return Vec::new();
    };
    let ty = source[start..]
        .split(';')
        .next()
        .and_then(|d| d.split_once(':'))
        .map(|(_, ty)| ty);
    match ty {
        Some(ty) => struct_fields(source, ty),
        None => Vec::new(),
    }
}

/// `@align(16)effect:f32` -> `effect:f32`.
fn strip_attributes(field: &str) -> &str {
    let mut rest = field;
    while let Some(after) = rest.strip_prefix('@') {
        rest = match after.find(')') {
            Some(end) if after[..end].contains('(') => &after[end + 1..],
            _ => return rest,
        };
    }
    rest
}
