/// Lit, textured surface shader.
///
/// Group 0 holds per-frame camera and light data, group 1 the material:
/// parameters plus colour, tangent-space normal and roughness maps, each with
/// its own sampler. Model matrices arrive as per-instance vertex attributes.
pub const SURFACE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    sun_dir: vec4<f32>,
    sun_color: vec4<f32>,
    ambient: vec4<f32>,
};

struct MaterialParams {
    base_color: vec4<f32>,
    // roughness, metalness, uv repeat u, uv repeat v
    params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;

@group(1) @binding(0) var<uniform> material: MaterialParams;
@group(1) @binding(1) var color_tex: texture_2d<f32>;
@group(1) @binding(2) var color_sampler: sampler;
@group(1) @binding(3) var normal_tex: texture_2d<f32>;
@group(1) @binding(4) var normal_sampler: sampler;
@group(1) @binding(5) var roughness_tex: texture_2d<f32>;
@group(1) @binding(6) var roughness_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
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

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv * material.params.zw;
    return out;
}

const PI: f32 = 3.14159265;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(color_tex, color_sampler, in.uv).rgb * material.base_color.rgb;
    let roughness = clamp(material.params.x * textureSample(roughness_tex, roughness_sampler, in.uv).g, 0.04, 1.0);
    let metalness = material.params.y;

    // Tangent frame for a surface parameterised along world x (u) and -z (v).
    let n_geo = normalize(in.world_normal);
    let t = normalize(vec3<f32>(1.0, 0.0, 0.0) - n_geo * n_geo.x);
    let b = cross(n_geo, t);
    let tn = textureSample(normal_tex, normal_sampler, in.uv).xyz * 2.0 - 1.0;
    let n = normalize(t * tn.x + b * tn.y + n_geo * tn.z);

    let l = normalize(frame.sun_dir.xyz);
    let v = normalize(frame.camera_pos.xyz - in.world_pos);
    let h = normalize(l + v);
    let ndl = max(dot(n, l), 0.0);

    let shininess = mix(256.0, 2.0, roughness);
    let f0 = mix(vec3<f32>(0.04), albedo, metalness);
    let specular = f0 * pow(max(dot(n, h), 0.0), shininess) * (shininess + 8.0) / (8.0 * PI);
    let diffuse = albedo * (1.0 - metalness);

    let lit = frame.ambient.rgb * albedo + frame.sun_color.rgb * ndl * (diffuse + specular);
    return vec4<f32>(lit, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_present() {
        assert!(SURFACE_SHADER.contains("fn vs_main"));
        assert!(SURFACE_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn material_bindings_are_contiguous() {
        for binding in 0..7 {
            let tag = format!("@group(1) @binding({binding})");
            assert!(SURFACE_SHADER.contains(&tag), "missing {tag}");
        }
    }
}
