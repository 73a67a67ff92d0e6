//! Surface material of the core mesh.
//!
//! The fragment color is a two-color gradient driven by animated noise, pushed
//! toward a light edge color where the surface turns away from the viewer. The
//! same edge term drives opacity, so silhouettes glow while face-on regions
//! stay mostly transparent.
//!
//! [`shade_fragment`] is the CPU reference of the fragment stage generated by
//! [`surface_wgsl`]. It exists for tests and tooling; rendering always goes
//! through the GPU.

use glam::{Vec3, Vec4};

use crate::gpu::uniforms::FRAME_UNIFORMS_WGSL;
use crate::noise::{simplex3, NOISE_WGSL};

/// Gradient start.
pub const DEEP_BLUE: Vec3 = Vec3::new(0.1, 0.2, 0.8);
/// Gradient end.
pub const MAGENTA: Vec3 = Vec3::new(0.8, 0.2, 0.9);
/// Silhouette color.
pub const LIGHT_CYAN: Vec3 = Vec3::new(0.5, 0.8, 1.0);

/// Spatial frequency of the noise over the unit normal.
pub const NOISE_FREQUENCY: f32 = 4.0;
/// Speed at which the noise field drifts with time.
pub const NOISE_DRIFT: f32 = 0.2;

/// Opacity of a fragment facing the viewer head-on.
pub const BASE_ALPHA: f32 = 0.1;
/// Opacity added at full edge strength.
pub const EDGE_ALPHA: f32 = 0.6;

/// View-dependent edge strength in `[0, 1]`.
///
/// `normal` is the view-space unit normal and `view_position` the view-space
/// fragment position. 0.0 when the surface faces the viewer, 1.0 when it is
/// seen edge-on.
pub fn edge_term(normal: Vec3, view_position: Vec3) -> f32 {
    let facing = normal.dot(view_position.normalize_or_zero()).abs().min(1.0);
    (1.0 - facing).powi(2)
}

/// Noise remapped to `[0, 1]` for the gradient blend.
pub fn noise_factor(normal: Vec3, time: f32) -> f32 {
    (simplex3(normal * NOISE_FREQUENCY + time * NOISE_DRIFT) + 1.0) * 0.5
}

/// Color and opacity of one surface fragment.
pub fn shade_fragment(normal: Vec3, view_position: Vec3, time: f32) -> Vec4 {
    let edge = edge_term(normal, view_position);
    let base = DEEP_BLUE.lerp(MAGENTA, noise_factor(normal, time));
    let color = base.lerp(LIGHT_CYAN, edge);
    color.extend(edge * EDGE_ALPHA + BASE_ALPHA)
}

fn wgsl_vec3(v: Vec3) -> String {
    format!("vec3<f32>({:?}, {:?}, {:?})", v.x, v.y, v.z)
}

/// Full WGSL module of the surface material (`vs_main` / `fs_main`).
///
/// Bindings: group 0 binding 0 is the [`FrameUniforms`](crate::gpu::uniforms::FrameUniforms)
/// buffer. Vertex inputs are position at location 0 and normal at location 1.
pub fn surface_wgsl() -> String {
    format!(
        r#"{FRAME_UNIFORMS_WGSL}
{NOISE_WGSL}
const DEEP_BLUE = {deep_blue};
const MAGENTA = {magenta};
const LIGHT_CYAN = {light_cyan};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

struct VertexInput {{
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}};

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) view_position: vec3<f32>,
}};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {{
    let normal_matrix = mat3x3<f32>(
        frame.normal_matrix[0].xyz,
        frame.normal_matrix[1].xyz,
        frame.normal_matrix[2].xyz,
    );
    let view_position = frame.model_view * vec4<f32>(in.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.projection * view_position;
    out.normal = normalize(normal_matrix * in.normal);
    out.view_position = view_position.xyz;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let facing = clamp(1.0 - abs(dot(in.normal, normalize(in.view_position))), 0.0, 1.0);
    let edge = pow(facing, 2.0);
    let n = (snoise3(in.normal * {frequency:?} + frame.time * {drift:?}) + 1.0) * 0.5;
    let base = mix(DEEP_BLUE, MAGENTA, n);
    let color = mix(base, LIGHT_CYAN, edge);
    return vec4<f32>(color, edge * {edge_alpha:?} + {base_alpha:?});
}}
"#,
        deep_blue = wgsl_vec3(DEEP_BLUE),
        magenta = wgsl_vec3(MAGENTA),
        light_cyan = wgsl_vec3(LIGHT_CYAN),
        frequency = NOISE_FREQUENCY,
        drift = NOISE_DRIFT,
        edge_alpha = EDGE_ALPHA,
        base_alpha = BASE_ALPHA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_face_on_alpha_is_base_for_any_time() {
        // Normal points straight back at the camera.
        let normal = Vec3::Z;
        let view_position = Vec3::new(0.0, 0.0, -2.0);
        for time in [0.0, 1.0, 17.5, 1234.0] {
            let frag = shade_fragment(normal, view_position, time);
            assert!(approx(frag.w, 0.1), "alpha {} at t={time}", frag.w);
        }
    }

    #[test]
    fn test_perpendicular_alpha_is_peak() {
        let normal = Vec3::X;
        let view_position = Vec3::new(0.0, 0.0, -2.0);
        let frag = shade_fragment(normal, view_position, 3.0);
        assert!(approx(frag.w, 0.7));
        // Full edge means the color is the edge color regardless of noise.
        assert!((frag.truncate() - LIGHT_CYAN).length() < 1e-5);
    }

    #[test]
    fn test_edge_term_bounds() {
        assert!(approx(edge_term(Vec3::Z, Vec3::NEG_Z), 0.0));
        assert!(approx(edge_term(Vec3::Y, Vec3::NEG_Z), 1.0));
        let tilted = Vec3::new(0.0, 0.5, 0.5).normalize();
        let e = edge_term(tilted, Vec3::NEG_Z);
        assert!(e > 0.0 && e < 1.0);
    }

    #[test]
    fn test_color_stays_in_palette_range() {
        for i in 0..200 {
            let angle = i as f32 * 0.13;
            let normal = Vec3::new(angle.cos(), angle.sin(), 0.3).normalize();
            let frag = shade_fragment(normal, Vec3::new(0.1, -0.2, -3.0), i as f32 * 0.05);
            for c in frag.truncate().to_array() {
                assert!((0.0..=1.0).contains(&c));
            }
            assert!((0.1..=0.7 + 1e-5).contains(&frag.w));
        }
    }

    #[test]
    fn test_noise_factor_in_unit_range() {
        for i in 0..500 {
            let n = Vec3::new((i as f32).sin(), (i as f32 * 0.7).cos(), 0.4).normalize();
            let f = noise_factor(n, i as f32 * 0.1);
            assert!((-0.03..=1.03).contains(&f));
        }
    }

    #[test]
    fn test_wgsl_embeds_palette_and_noise() {
        let src = surface_wgsl();
        assert!(src.contains("fn snoise3"));
        assert!(src.contains("const DEEP_BLUE = vec3<f32>(0.1, 0.2, 0.8);"));
        assert!(src.contains("@vertex"));
        assert!(src.contains("@fragment"));
    }
}
