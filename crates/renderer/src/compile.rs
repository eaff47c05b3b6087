use std::borrow::Cow;

use wgpu::naga::{self, ShaderStage};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to parse {stage:?} shader: {message}")]
    Parse { stage: ShaderStage, message: String },
    #[error("{stage:?} shader failed validation: {message}")]
    Validation { stage: ShaderStage, message: String },
}

/// GLSL sources that passed parsing and validation once at startup.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    vertex: Cow<'static, str>,
    fragment: Cow<'static, str>,
}

impl ShaderLibrary {
    pub fn load() -> Result<Self, ShaderError> {
        validate_glsl(VERTEX_SHADER_GLSL, ShaderStage::Vertex)?;
        validate_glsl(FRAGMENT_SHADER_GLSL, ShaderStage::Fragment)?;
        tracing::debug!("slide shaders validated");
        Ok(Self {
            vertex: Cow::Borrowed(VERTEX_SHADER_GLSL),
            fragment: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
        })
    }

    pub(crate) fn vertex_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fullscreen triangle vertex"),
            source: wgpu::ShaderSource::Glsl {
                shader: self.vertex.clone(),
                stage: ShaderStage::Vertex,
                defines: &[],
            },
        })
    }

    pub(crate) fn fragment_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("slide fragment"),
            source: wgpu::ShaderSource::Glsl {
                shader: self.fragment.clone(),
                stage: ShaderStage::Fragment,
                defines: &[],
            },
        })
    }
}

/// Runs naga's GLSL frontend and validator over `source`.
pub fn validate_glsl(source: &str, stage: ShaderStage) -> Result<(), ShaderError> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let module = frontend
        .parse(&naga::front::glsl::Options::from(stage), source)
        .map_err(|err| ShaderError::Parse {
            stage,
            message: format!("{err:?}"),
        })?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|err| ShaderError::Validation {
        stage,
        message: format!("{err:?}"),
    })?;
    Ok(())
}

/// Slide compositor.
///
/// The uniform block layout must match [`SlideUniforms`](crate::gpu::SlideUniforms).
/// `v_uv` has a bottom-left origin; slide textures are uploaded flipped so the
/// same convention holds for texture space.
const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform SlideParams {
    vec2 resolution;
    vec2 pointer;
    vec2 texture1Size;
    vec2 texture2Size;
    float progress;
    float zoom1;
    float zoom2;
    float grain;
    float brightness;
    float time;
    float activity;
    float markerCount;
    float activeMarker;
    float hoveredMarker;
    float waveAmplitude;
    float waveFrequency;
    float waveSpeed;
    float rippleRadius;
    float rippleFrequency;
    float rippleSpeed;
    float rippleStrength;
    float markerRadius;
    float markerSpacing;
    float markerMargin;
} params;

layout(set = 1, binding = 0) uniform texture2D slideTexture1;
layout(set = 1, binding = 1) uniform sampler slideSampler1;
layout(set = 1, binding = 2) uniform texture2D slideTexture2;
layout(set = 1, binding = 3) uniform sampler slideSampler2;

const int MAX_MARKERS = 32;

vec2 coverUv(vec2 uv, vec2 textureSize, float zoom) {
    vec2 res = max(params.resolution, vec2(1.0));
    vec2 tex = max(textureSize, vec2(1.0));
    float scale = max(res.x / tex.x, res.y / tex.y) * zoom;
    vec2 visible = res / (tex * scale);
    return (uv - vec2(0.5)) * visible + vec2(0.5);
}

float insideUnit(vec2 uv) {
    vec2 inside = step(vec2(0.0), uv) * step(uv, vec2(1.0));
    return inside.x * inside.y;
}

float grainNoise(vec2 p) {
    p = fract(p * vec2(123.34, 456.21));
    p += dot(p, p + vec2(45.32));
    return fract(p.x * p.y);
}

vec3 drawMarkers(vec3 color, vec2 fragPx) {
    float firstX = params.resolution.x * 0.5
        - (params.markerCount - 1.0) * 0.5 * params.markerSpacing;
    for (int i = 0; i < MAX_MARKERS; i++) {
        float index = float(i);
        if (index >= params.markerCount) {
            break;
        }
        vec2 center = vec2(firstX + index * params.markerSpacing, params.markerMargin);
        float dist = length(fragPx - center);
        float fill = 1.0 - smoothstep(params.markerRadius - 1.0, params.markerRadius, dist);
        float active = 1.0 - step(0.5, abs(index - params.activeMarker));
        float hovered = 1.0 - step(0.5, abs(index - params.hoveredMarker));
        float alpha = max(mix(0.4, 1.0, active), 0.75 * hovered);
        color = mix(color, vec3(1.0), fill * alpha);
    }
    return color;
}

void main() {
    vec2 uv = v_uv;
    float t = params.time;

    uv.x += params.waveAmplitude * sin(uv.y * params.waveFrequency + t * params.waveSpeed);
    uv.y += params.waveAmplitude
        * sin(uv.x * params.waveFrequency * 0.7 + t * params.waveSpeed * 0.8) * 0.5;

    float aspect = params.resolution.x / max(params.resolution.y, 1.0);
    vec2 delta = uv - params.pointer;
    delta.x *= aspect;
    float dist = length(delta);
    float falloff = 1.0 - smoothstep(0.0, params.rippleRadius, dist);
    float gate = step(0.01, params.activity);
    float ripple = sin(dist * params.rippleFrequency - t * params.rippleSpeed)
        * falloff * params.activity * gate;
    vec2 direction = delta / max(dist, 0.0001);
    direction.x /= aspect;
    uv += direction * ripple * params.rippleStrength;

    vec2 uv1 = coverUv(uv, params.texture1Size, params.zoom1);
    vec2 uv2 = coverUv(uv, params.texture2Size, params.zoom2);
    vec3 color1 = texture(sampler2D(slideTexture1, slideSampler1), uv1).rgb * insideUnit(uv1);
    vec3 color2 = texture(sampler2D(slideTexture2, slideSampler2), uv2).rgb * insideUnit(uv2);
    vec3 color = mix(color1, color2, params.progress);

    float noise = grainNoise(v_uv * params.resolution + vec2(fract(t * 7.0) * 613.0)) - 0.5;
    color += vec3(noise * params.grain);
    color *= params.brightness;

    color = drawMarkers(color, v_uv * params.resolution);
    outColor = vec4(clamp(color, vec3(0.0), vec3(1.0)), 1.0);
}
";

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
