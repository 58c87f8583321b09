/// Lit, instanced scene geometry.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let ambient = 0.35;
    let diffuse = max(dot(in.world_normal, light_dir), 0.0);
    let lighting = ambient + diffuse * 0.9;
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;

/// Screen-space HUD triangles with per-vertex color.
pub const HUD_SHADER: &str = r#"
struct Uniforms {
    screen_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct HudVertex {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
};

struct HudOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_hud(vertex: HudVertex) -> HudOutput {
    var out: HudOutput;
    out.clip_position = uniforms.screen_proj * vec4<f32>(vertex.position, 0.5, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_hud(in: HudOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Single triangle covering the viewport; no vertex buffer.
pub const FULLSCREEN_VS: &str = r#"
struct FullscreenOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: FullscreenOutput;
    out.position = vec4<f32>(uv * vec2<f32>(2.0, -2.0) + vec2<f32>(-1.0, 1.0), 0.0, 1.0);
    out.uv = uv;
    return out;
}

struct PostParams {
    threshold: f32,
    bloom_intensity: f32,
    base_intensity: f32,
    bloom_saturation: f32,
    base_saturation: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};
"#;

/// Keeps only the part of each pixel brighter than the threshold.
pub const BLOOM_EXTRACT_FS: &str = r#"
@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: PostParams;

@fragment
fn fs_extract(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let color = textureSample(source, source_sampler, in.uv);
    let range = max(1.0 - params.threshold, 0.0001);
    return saturate((color - vec4<f32>(params.threshold)) / range);
}
"#;

/// One separable Gaussian pass; offsets already point along the pass axis.
pub const BLOOM_BLUR_FS: &str = r#"
struct Kernel {
    samples: array<vec4<f32>, 31>,
    count: u32,
};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> kernel: Kernel;

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    var color = vec4<f32>(0.0);
    for (var i = 0u; i < kernel.count; i++) {
        let s = kernel.samples[i];
        color += textureSample(source, source_sampler, in.uv + s.xy) * s.z;
    }
    return color;
}
"#;

/// Blends the blurred highlights back over the scene.
pub const BLOOM_COMBINE_FS: &str = r#"
@group(0) @binding(0) var scene_texture: texture_2d<f32>;
@group(0) @binding(1) var linear_sampler: sampler;
@group(0) @binding(2) var<uniform> params: PostParams;
@group(0) @binding(3) var bloom_texture: texture_2d<f32>;

fn adjust_saturation(color: vec3<f32>, saturation: f32) -> vec3<f32> {
    let grey = dot(color, vec3<f32>(0.3, 0.59, 0.11));
    return mix(vec3<f32>(grey), color, saturation);
}

@fragment
fn fs_combine(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let bloom_sample = textureSample(bloom_texture, linear_sampler, in.uv).rgb;
    let base_sample = textureSample(scene_texture, linear_sampler, in.uv).rgb;

    let bloom = adjust_saturation(bloom_sample, params.bloom_saturation) * params.bloom_intensity;
    var base = adjust_saturation(base_sample, params.base_saturation) * params.base_intensity;

    // Darken the base where bloom is strong so highlights don't blow out.
    base = base * (vec3<f32>(1.0) - saturate(bloom));
    return vec4<f32>(base + bloom, 1.0);
}
"#;

/// Straight copy used while bloom is bypassed.
pub const COPY_FS: &str = r#"
@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: PostParams;

@fragment
fn fs_copy(in: FullscreenOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(source, source_sampler, in.uv).rgb, 1.0);
}
"#;

/// Fullscreen vertex stage plus one fragment stage.
pub fn post_shader(fragment: &str) -> String {
    format!("{FULLSCREEN_VS}{fragment}")
}
