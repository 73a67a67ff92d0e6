//! Draws the object graph into an offscreen HDR target.
//!
//! One pipeline per material: the noise-shaded core, the line wireframe over
//! the same vertex buffer, and camera-facing particle sprites instanced over
//! the point cloud buffer. Every material is transparent, so they draw in
//! composition order with depth testing against a shared depth buffer.

use wgpu::util::DeviceExt;

use super::uniforms::{FrameUniforms, FRAME_UNIFORMS_WGSL};
use super::{upload_texture, DEPTH_FORMAT, HDR_FORMAT};
use crate::geometry::Vertex;
use crate::scene::{Material, PointsMaterial, RenderState, Scene, WireframeMaterial};
use crate::shading::surface_wgsl;

/// Quad corners per particle sprite.
const VERTICES_PER_SPRITE: u32 = 6;

/// Per-instance layout of the particle position buffer.
const PARTICLE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    }],
};

/// GPU resources for the scene's three materials.
pub struct ScenePass {
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sprite_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    line_index_buffer: wgpu::Buffer,
    particle_buffer: wgpu::Buffer,
    core_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    vertex_count: u32,
    line_index_count: u32,
    particle_count: u32,
}

impl ScenePass {
    /// Upload the scene's buffers and build its pipelines.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) -> Self {
        let group = &scene.group;
        let geometry = group.core.geometry();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Vertex Buffer"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let line_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wireframe Index Buffer"),
            contents: bytemuck::cast_slice(group.wireframe.geometry().line_indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Position Buffer"),
            contents: bytemuck::cast_slice(group.particles.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let sprite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let (sprite_view, sprite_sampler) =
            upload_texture(device, queue, &group.particles.material.sprite, "Particle Sprite");
        let sprite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Bind Group"),
            layout: &sprite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sprite_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sprite_sampler),
                },
            ],
        });

        let core_pipeline = create_pipeline(
            device,
            "Core",
            &surface_wgsl(),
            &[&uniform_layout],
            &[Vertex::LAYOUT],
            wgpu::PrimitiveTopology::TriangleList,
            group.core.material.render_state(),
        );
        let wireframe_pipeline = create_pipeline(
            device,
            "Wireframe",
            &wireframe_wgsl(&group.wireframe.material),
            &[&uniform_layout],
            &[Vertex::LAYOUT],
            wgpu::PrimitiveTopology::LineList,
            group.wireframe.material.render_state(),
        );
        let particle_pipeline = create_pipeline(
            device,
            "Particles",
            &particle_wgsl(&group.particles.material),
            &[&uniform_layout, &sprite_layout],
            &[PARTICLE_LAYOUT],
            wgpu::PrimitiveTopology::TriangleList,
            group.particles.material.render_state(),
        );

        Self {
            uniform_buffer,
            uniform_bind_group,
            sprite_bind_group,
            vertex_buffer,
            line_index_buffer,
            particle_buffer,
            core_pipeline,
            wireframe_pipeline,
            particle_pipeline,
            vertex_count: geometry.vertex_count(),
            line_index_count: geometry.line_indices().len() as u32,
            particle_count: group.particles.len() as u32,
        }
    }

    /// Upload this frame's transforms and time.
    pub fn update(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Clear `color`/`depth` and draw core, wireframe, then particles.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &self.uniform_bind_group, &[]);

        pass.set_pipeline(&self.core_pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);

        pass.set_pipeline(&self.wireframe_pipeline);
        pass.set_index_buffer(self.line_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.line_index_count, 0, 0..1);

        pass.set_pipeline(&self.particle_pipeline);
        pass.set_bind_group(1, &self.sprite_bind_group, &[]);
        pass.set_vertex_buffer(0, self.particle_buffer.slice(..));
        pass.draw(0..VERTICES_PER_SPRITE, 0..self.particle_count);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    state: RenderState,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(state.blend.blend_state()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: state.cull_back_faces.then_some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: state.depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn wgsl_rgb(rgb: [f32; 3]) -> String {
    format!("vec3<f32>({:?}, {:?}, {:?})", rgb[0], rgb[1], rgb[2])
}

/// WGSL of the flat translucent line material.
pub fn wireframe_wgsl(material: &WireframeMaterial) -> String {
    format!(
        r#"{FRAME_UNIFORMS_WGSL}
@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {{
    return frame.projection * frame.model_view * vec4<f32>(position, 1.0);
}}

@fragment
fn fs_main() -> @location(0) vec4<f32> {{
    return vec4<f32>({color}, {opacity:?});
}}
"#,
        color = wgsl_rgb(material.color),
        opacity = material.opacity,
    )
}

/// WGSL of the particle sprites.
///
/// Each instance expands into a screen-aligned quad whose on-screen size is
/// `point_size` divided by view depth, in units of half the target height.
pub fn particle_wgsl(material: &PointsMaterial) -> String {
    format!(
        r#"{FRAME_UNIFORMS_WGSL}
@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

@group(1) @binding(0)
var sprite: texture_2d<f32>;
@group(1) @binding(1)
var sprite_sampler: sampler;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) center: vec3<f32>,
) -> VertexOutput {{
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    let clip = frame.projection * frame.model_view * vec4<f32>(center, 1.0);
    let half_size = frame.point_size * 0.5;
    // Keep sprites square on non-square targets.
    let inv_aspect = frame.projection[0][0] / frame.projection[1][1];

    var out: VertexOutput;
    let offset = vec2<f32>(corner.x * half_size * inv_aspect, corner.y * half_size);
    out.clip_position = clip + vec4<f32>(offset, 0.0, 0.0);
    out.uv = corner * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5);
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let texel = textureSample(sprite, sprite_sampler, in.uv);
    return vec4<f32>({color} * texel.rgb, texel.a);
}}
"#,
        color = wgsl_rgb(material.color),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrbConfig;

    #[test]
    fn test_particle_layout_is_tightly_packed() {
        assert_eq!(PARTICLE_LAYOUT.array_stride, 12);
        assert_eq!(PARTICLE_LAYOUT.step_mode, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn test_wireframe_wgsl_bakes_color() {
        let scene = Scene::compose(&OrbConfig::default());
        let src = wireframe_wgsl(&scene.group.wireframe.material);
        assert!(src.contains("return vec4<f32>(vec3<f32>(0.50196"));
        assert!(src.contains(", 1.0), 0.1);"));
    }

    #[test]
    fn test_particle_wgsl_samples_sprite() {
        let scene = Scene::compose(&OrbConfig::default());
        let src = particle_wgsl(&scene.group.particles.material);
        assert!(src.contains("textureSample(sprite, sprite_sampler, in.uv)"));
        assert!(src.contains("vec3<f32>(1.0, 1.0, 1.0) * texel.rgb"));
    }
}
