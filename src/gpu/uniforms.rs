//! Per-frame uniform data shared by every scene material.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};

/// WGSL declaration matching [`FrameUniforms`].
pub const FRAME_UNIFORMS_WGSL: &str = r#"
struct FrameUniforms {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    time: f32,
    point_size: f32,
    _pad: vec2<f32>,
};
"#;

/// Transform and animation state uploaded once per frame.
///
/// The three meshes are children of the same group, so one model-view
/// matrix serves all of them.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Inverse transpose of the upper 3x3 of `model_view`, padded to 4x4.
    pub normal_matrix: [[f32; 4]; 4],
    /// Elapsed seconds; the surface material's only mutable uniform.
    pub time: f32,
    /// World-space particle size.
    pub point_size: f32,
    pub _pad: [f32; 2],
}

impl FrameUniforms {
    pub fn new(model_view: Mat4, projection: Mat4, time: f32, point_size: f32) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal_matrix: normal_matrix(model_view).to_cols_array_2d(),
            time,
            point_size,
            _pad: [0.0; 2],
        }
    }
}

/// Normal matrix of `model_view`, embedded in a 4x4 so it keeps std140 column
/// alignment on the GPU.
pub fn normal_matrix(model_view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(model_view).inverse().transpose())
}
