/// WGSL for every technique. Entry points: `vs_flat` and `vs_textured` per vertex
/// format, `fs_basic`, `fs_textured` and `fs_multi` per technique.
pub const STATION_SHADER: &str = r#"
struct Light {
    // xyz, w = type (0 point, 1 directional, 2 spot)
    position: vec4<f32>,
    // xyz, w = spot angle
    direction: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    // enabled, diffuse intensity, specular intensity, specular power
    params: vec4<f32>,
};

struct Draw {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    texture_matrix: mat4x4<f32>,
    // xyz, w = side
    camera: vec4<f32>,
    // enabled, start, end
    fog: vec4<f32>,
    // rgb, w = intensity
    ambient: vec4<f32>,
    // clipping plane, mip bias
    clip: vec4<f32>,
    lights: array<Light, 4>,
};

@group(0) @binding(0)
var<uniform> draw: Draw;

@group(1) @binding(0) var t0: texture_2d<f32>;
@group(1) @binding(1) var s0: sampler;
@group(1) @binding(2) var t1: texture_2d<f32>;
@group(1) @binding(3) var s1: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) uv: vec2<f32>,
    @location(4) detail_uv: vec2<f32>,
    @location(5) view_depth: f32,
};

fn project(position: vec3<f32>, normal: vec3<f32>) -> VertexOutput {
    let world_position = draw.world * vec4<f32>(position, 1.0);
    // The back-face pass lights the inside of each surface.
    let side = select(1.0, draw.camera.w, draw.camera.w != 0.0);

    let view_position = draw.view * world_position;

    var out: VertexOutput;
    out.clip_position = draw.projection * view_position;
    out.view_depth = -view_position.z;
    out.world_position = world_position.xyz;
    out.normal = (draw.world * vec4<f32>(normal, 0.0)).xyz * side;
    out.color = vec4<f32>(1.0);
    out.uv = vec2<f32>(0.0);
    out.detail_uv = vec2<f32>(0.0);
    return out;
}

@vertex
fn vs_flat(
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) normal: vec3<f32>,
) -> VertexOutput {
    var out = project(position, normal);
    out.color = color;
    return out;
}

@vertex
fn vs_textured(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
) -> VertexOutput {
    var out = project(position, normal);
    out.uv = (draw.texture_matrix * vec4<f32>(tex_coord, 0.0, 1.0)).xy;
    out.detail_uv = tex_coord;
    return out;
}

fn shade(base: vec4<f32>, world_position: vec3<f32>, normal: vec3<f32>) -> vec4<f32> {
    let n = normalize(normal);
    let to_eye = normalize(draw.camera.xyz - world_position);
    var light_sum = draw.ambient.rgb * draw.ambient.w;

    for (var i = 0u; i < 4u; i = i + 1u) {
        let light = draw.lights[i];
        if (light.params.x < 0.5) {
            continue;
        }
        var to_light = normalize(light.position.xyz - world_position);
        var strength = 1.0;
        if (light.position.w > 0.5 && light.position.w < 1.5) {
            to_light = normalize(-light.direction.xyz);
        } else if (light.position.w >= 1.5) {
            let cone = max(dot(-to_light, normalize(light.direction.xyz)), 0.0);
            strength = pow(cone, 1.0 / max(light.direction.w, 0.001));
        }

        let diffuse = max(dot(n, to_light), 0.0) * light.params.y;
        let reflected = reflect(-to_light, n);
        let specular = pow(max(dot(reflected, to_eye), 0.0), light.params.w) * light.params.z;
        light_sum += strength * (light.diffuse.rgb * diffuse + light.specular.rgb * specular);
    }

    var color = base.rgb * light_sum;
    if (draw.fog.x > 0.5) {
        let eye_distance = length(draw.camera.xyz - world_position);
        let amount = clamp((eye_distance - draw.fog.y) / max(draw.fog.z - draw.fog.y, 0.001), 0.0, 1.0);
        color = mix(color, vec3<f32>(1.0), amount);
    }
    return vec4<f32>(color, base.a);
}

fn lod_bias() -> f32 {
    return clamp(draw.clip.y, -16.0, 15.99);
}

// Samples are taken before any discard so they stay in uniform control flow.
@fragment
fn fs_basic(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.view_depth < draw.clip.x) {
        discard;
    }
    return shade(in.color, in.world_position, in.normal);
}

@fragment
fn fs_textured(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSampleBias(t0, s0, in.uv, lod_bias());
    if (in.view_depth < draw.clip.x) {
        discard;
    }
    return shade(base, in.world_position, in.normal);
}

@fragment
fn fs_multi(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSampleBias(t0, s0, in.uv, lod_bias());
    let detail = textureSampleBias(t1, s1, in.detail_uv, lod_bias());
    if (in.view_depth < draw.clip.x) {
        discard;
    }
    let mixed = vec4<f32>(mix(base.rgb, detail.rgb, detail.a), base.a);
    return shade(mixed, in.world_position, in.normal);
}
"#;
