//! Bloom post-processing.
//!
//! The scene is rendered into an offscreen HDR texture owned here. Each frame
//! [`PostProcess::composite`] then:
//!
//! 1. extracts bright pixels into a half-resolution target (luminance high-pass),
//! 2. blurs them down a chain of [`MIP_COUNT`] targets, each half the size of the
//!    previous, with a separable Gaussian (horizontal then vertical) per level,
//! 3. adds the weighted sum of all blur levels on top of the scene and writes
//!    the result to the display surface.
//!
//! Kernel widths and mip weights are baked into generated WGSL; only the blur
//! direction and texel size live in uniform buffers, rewritten on resize.

use bytemuck::{Pod, Zeroable};

use super::{create_color_target, create_depth_texture, create_linear_sampler, HDR_FORMAT};
use crate::config::BloomSettings;

/// Number of blur levels.
pub const MIP_COUNT: usize = 5;

/// Gaussian kernel radius per level. Sigma equals the radius.
pub const KERNEL_RADII: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];

/// Base weights of the blur levels before the radius blend.
pub const MIP_FACTORS: [f32; MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Width of the soft knee above the luminance threshold.
pub const HIGH_PASS_SMOOTH_WIDTH: f32 = 0.01;

/// Per-pass uniforms of the blur shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlurUniforms {
    /// (1, 0) for the horizontal pass, (0, 1) for the vertical pass.
    pub direction: [f32; 2],
    /// 1.0 / target width, 1.0 / target height.
    pub inv_size: [f32; 2],
}

/// Truncated Gaussian weights `w[0..radius]` with sigma = radius.
pub fn gaussian_coefficients(radius: u32) -> Vec<f32> {
    let sigma = radius.max(1) as f32;
    (0..radius.max(1))
        .map(|i| {
            let x = i as f32;
            0.39894 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
        })
        .collect()
}

/// Final weight of each blur level: `mix(f, 1.2 - f, radius)`.
pub fn bloom_factors(radius: f32) -> [f32; MIP_COUNT] {
    MIP_FACTORS.map(|f| f + (1.2 - 2.0 * f) * radius)
}

/// Target size of each blur level for a full-size viewport of `width` x `height`.
///
/// Level 0 is half the viewport, each further level half of the previous,
/// rounded and never below one pixel.
pub fn mip_sizes(width: u32, height: u32) -> [(u32, u32); MIP_COUNT] {
    let mut sizes = [(1, 1); MIP_COUNT];
    let (mut w, mut h) = (width, height);
    for size in sizes.iter_mut() {
        w = w.div_ceil(2).max(1);
        h = h.div_ceil(2).max(1);
        *size = (w, h);
    }
    sizes
}

const FULLSCREEN_VS: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}
"#;

/// WGSL of the luminance high-pass.
pub fn high_pass_wgsl(threshold: f32) -> String {
    format!(
        r#"{FULLSCREEN_VS}
@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let texel = textureSample(source, source_sampler, in.uv);
    let luma = dot(texel.rgb, vec3<f32>(0.299, 0.587, 0.114));
    let keep = smoothstep({low:?}, {high:?}, luma);
    return texel * keep;
}}
"#,
        low = threshold,
        high = threshold + HIGH_PASS_SMOOTH_WIDTH,
    )
}

/// WGSL of one separable blur level with `radius` taps per side, unrolled.
pub fn blur_wgsl(radius: u32) -> String {
    let coefficients = gaussian_coefficients(radius);
    let weight_sum: f32 = coefficients[0] + 2.0 * coefficients[1..].iter().sum::<f32>();

    let mut taps = String::new();
    for (i, w) in coefficients.iter().enumerate().skip(1) {
        taps.push_str(&format!(
            "    sum += (tap(in.uv + offset * {i}.0) + tap(in.uv - offset * {i}.0)) * {w:?};\n"
        ));
    }

    format!(
        r#"{FULLSCREEN_VS}
struct BlurUniforms {{
    direction: vec2<f32>,
    inv_size: vec2<f32>,
}};

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> blur: BlurUniforms;

fn tap(uv: vec2<f32>) -> vec3<f32> {{
    return textureSample(source, source_sampler, uv).rgb;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let offset = blur.direction * blur.inv_size;
    var sum = tap(in.uv) * {center:?};
{taps}    return vec4<f32>(sum / {weight_sum:?}, 1.0);
}}
"#,
        center = coefficients[0],
    )
}

/// WGSL of the final composite: scene plus weighted blur levels.
pub fn composite_wgsl(settings: &BloomSettings) -> String {
    let factors = bloom_factors(settings.radius);

    let mut bindings = String::new();
    let mut terms = Vec::with_capacity(MIP_COUNT);
    for (i, factor) in factors.iter().enumerate() {
        bindings.push_str(&format!(
            "@group(0) @binding({binding})\nvar blur_{i}: texture_2d<f32>;\n",
            binding = i + 1
        ));
        terms.push(format!(
            "textureSample(blur_{i}, linear_sampler, in.uv) * {factor:?}"
        ));
    }

    format!(
        r#"{FULLSCREEN_VS}
@group(0) @binding(0)
var scene: texture_2d<f32>;
{bindings}@group(0) @binding({sampler_binding})
var linear_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let base = textureSample(scene, linear_sampler, in.uv);
    let bloom = {strength:?} * ({sum});
    return vec4<f32>(base.rgb + bloom.rgb, min(base.a + bloom.a, 1.0));
}}
"#,
        sampler_binding = MIP_COUNT + 1,
        strength = settings.strength,
        sum = terms.join("\n        + "),
    )
}

/// Render targets sized to the viewport; rebuilt on every resize.
struct Targets {
    scene: wgpu::TextureView,
    depth: wgpu::TextureView,
    bright: wgpu::TextureView,
    horizontal: Vec<wgpu::TextureView>,
    vertical: Vec<wgpu::TextureView>,
    mip_sizes: [(u32, u32); MIP_COUNT],
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let mip_sizes = mip_sizes(width, height);
        let (bright_w, bright_h) = mip_sizes[0];
        Self {
            scene: create_color_target(device, "Scene Color Target", width, height),
            depth: create_depth_texture(device, width, height),
            bright: create_color_target(device, "Bloom Bright Target", bright_w, bright_h),
            horizontal: mip_sizes
                .iter()
                .map(|&(w, h)| create_color_target(device, "Bloom Horizontal Target", w, h))
                .collect(),
            vertical: mip_sizes
                .iter()
                .map(|&(w, h)| create_color_target(device, "Bloom Vertical Target", w, h))
                .collect(),
            mip_sizes,
        }
    }
}

/// Bind groups referencing the current [`Targets`].
struct BindGroups {
    high_pass: wgpu::BindGroup,
    horizontal: Vec<wgpu::BindGroup>,
    vertical: Vec<wgpu::BindGroup>,
    composite: wgpu::BindGroup,
}

/// Offscreen scene target plus the bloom chain that composites it to screen.
pub struct PostProcess {
    size: (u32, u32),
    targets: Targets,
    bind_groups: BindGroups,
    sampler: wgpu::Sampler,
    input_layout: wgpu::BindGroupLayout,
    blur_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    horizontal_uniforms: Vec<wgpu::Buffer>,
    vertical_uniforms: Vec<wgpu::Buffer>,
    high_pass_pipeline: wgpu::RenderPipeline,
    blur_pipelines: Vec<wgpu::RenderPipeline>,
    composite_pipeline: wgpu::RenderPipeline,
}

impl PostProcess {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
        settings: BloomSettings,
    ) -> Self {
        let sampler = create_linear_sampler(device, "Bloom Sampler");

        let input_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Input Layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Blur Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<BlurUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });
        let mut composite_entries: Vec<wgpu::BindGroupLayoutEntry> =
            (0..=MIP_COUNT as u32).map(texture_entry).collect();
        composite_entries.push(sampler_entry(MIP_COUNT as u32 + 1));
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Composite Layout"),
            entries: &composite_entries,
        });

        let high_pass_pipeline = create_fullscreen_pipeline(
            device,
            "Bloom High Pass",
            &high_pass_wgsl(settings.threshold),
            &input_layout,
            HDR_FORMAT,
        );
        let blur_pipelines = KERNEL_RADII
            .iter()
            .map(|&radius| {
                create_fullscreen_pipeline(
                    device,
                    "Bloom Blur",
                    &blur_wgsl(radius),
                    &blur_layout,
                    HDR_FORMAT,
                )
            })
            .collect();
        let composite_pipeline = create_fullscreen_pipeline(
            device,
            "Bloom Composite",
            &composite_wgsl(&settings),
            &composite_layout,
            surface_format,
        );

        let create_uniforms = |label: &str| -> Vec<wgpu::Buffer> {
            (0..MIP_COUNT)
                .map(|_| {
                    device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(label),
                        size: std::mem::size_of::<BlurUniforms>() as u64,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    })
                })
                .collect()
        };
        let horizontal_uniforms = create_uniforms("Bloom Horizontal Uniforms");
        let vertical_uniforms = create_uniforms("Bloom Vertical Uniforms");

        let width = width.max(1);
        let height = height.max(1);
        let targets = Targets::new(device, width, height);
        let bind_groups = create_bind_groups(
            device,
            &targets,
            &sampler,
            &input_layout,
            &blur_layout,
            &composite_layout,
            &horizontal_uniforms,
            &vertical_uniforms,
        );

        let post_process = Self {
            size: (width, height),
            targets,
            bind_groups,
            sampler,
            input_layout,
            blur_layout,
            composite_layout,
            horizontal_uniforms,
            vertical_uniforms,
            high_pass_pipeline,
            blur_pipelines,
            composite_pipeline,
        };
        post_process.write_blur_uniforms(queue);
        post_process
    }

    /// Offscreen target the scene is rendered into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene
    }

    /// Depth buffer matching [`scene_view`](Self::scene_view).
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.targets.depth
    }

    /// Recreate every target for the new viewport size. Same-size and zero-size
    /// calls are no-ops.
    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        self.targets = Targets::new(device, width, height);
        self.bind_groups = create_bind_groups(
            device,
            &self.targets,
            &self.sampler,
            &self.input_layout,
            &self.blur_layout,
            &self.composite_layout,
            &self.horizontal_uniforms,
            &self.vertical_uniforms,
        );
        self.write_blur_uniforms(queue);
    }

    fn write_blur_uniforms(&self, queue: &wgpu::Queue) {
        for (i, &(w, h)) in self.targets.mip_sizes.iter().enumerate() {
            let inv_size = [1.0 / w as f32, 1.0 / h as f32];
            let horizontal = BlurUniforms {
                direction: [1.0, 0.0],
                inv_size,
            };
            let vertical = BlurUniforms {
                direction: [0.0, 1.0],
                inv_size,
            };
            queue.write_buffer(&self.horizontal_uniforms[i], 0, bytemuck::bytes_of(&horizontal));
            queue.write_buffer(&self.vertical_uniforms[i], 0, bytemuck::bytes_of(&vertical));
        }
    }

    /// Record high-pass, blur chain and composite into `encoder`, writing the
    /// final image to `output`.
    pub fn composite(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        fullscreen_pass(
            encoder,
            "Bloom High Pass",
            &self.targets.bright,
            &self.high_pass_pipeline,
            &self.bind_groups.high_pass,
        );

        for i in 0..MIP_COUNT {
            fullscreen_pass(
                encoder,
                "Bloom Horizontal Blur",
                &self.targets.horizontal[i],
                &self.blur_pipelines[i],
                &self.bind_groups.horizontal[i],
            );
            fullscreen_pass(
                encoder,
                "Bloom Vertical Blur",
                &self.targets.vertical[i],
                &self.blur_pipelines[i],
                &self.bind_groups.vertical[i],
            );
        }

        fullscreen_pass(
            encoder,
            "Bloom Composite",
            output,
            &self.composite_pipeline,
            &self.bind_groups.composite,
        );
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn create_bind_groups(
    device: &wgpu::Device,
    targets: &Targets,
    sampler: &wgpu::Sampler,
    input_layout: &wgpu::BindGroupLayout,
    blur_layout: &wgpu::BindGroupLayout,
    composite_layout: &wgpu::BindGroupLayout,
    horizontal_uniforms: &[wgpu::Buffer],
    vertical_uniforms: &[wgpu::Buffer],
) -> BindGroups {
    let high_pass = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom High Pass Bind Group"),
        layout: input_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&targets.scene),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    let blur_group = |label: &str, source: &wgpu::TextureView, uniforms: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: blur_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    };

    let mut horizontal = Vec::with_capacity(MIP_COUNT);
    let mut vertical = Vec::with_capacity(MIP_COUNT);
    for i in 0..MIP_COUNT {
        // Each level blurs the previous level's finished output.
        let source = if i == 0 {
            &targets.bright
        } else {
            &targets.vertical[i - 1]
        };
        horizontal.push(blur_group(
            "Bloom Horizontal Bind Group",
            source,
            &horizontal_uniforms[i],
        ));
        vertical.push(blur_group(
            "Bloom Vertical Bind Group",
            &targets.horizontal[i],
            &vertical_uniforms[i],
        ));
    }

    let mut composite_entries = Vec::with_capacity(MIP_COUNT + 2);
    composite_entries.push(wgpu::BindGroupEntry {
        binding: 0,
        resource: wgpu::BindingResource::TextureView(&targets.scene),
    });
    for (i, view) in targets.vertical.iter().enumerate() {
        composite_entries.push(wgpu::BindGroupEntry {
            binding: i as u32 + 1,
            resource: wgpu::BindingResource::TextureView(view),
        });
    }
    composite_entries.push(wgpu::BindGroupEntry {
        binding: MIP_COUNT as u32 + 1,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    let composite = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Composite Bind Group"),
        layout: composite_layout,
        entries: &composite_entries,
    });

    BindGroups {
        high_pass,
        horizontal,
        vertical,
        composite,
    }
}

fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_uniforms_size_is_16_bytes() {
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 16);
    }

    #[test]
    fn test_coefficients_peak_at_center_and_decay() {
        for radius in KERNEL_RADII {
            let c = gaussian_coefficients(radius);
            assert_eq!(c.len(), radius as usize);
            assert!(c.windows(2).all(|w| w[1] < w[0]));
            assert!((c[0] - 0.39894 / radius as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bloom_factors_at_half_radius_are_flat() {
        // mix(f, 1.2 - f, 0.5) == 0.6 for every f
        for f in bloom_factors(0.5) {
            assert!((f - 0.6).abs() < 1e-6);
        }
        assert_eq!(bloom_factors(0.0), MIP_FACTORS);
    }

    #[test]
    fn test_mip_chain_halves_with_rounding() {
        let sizes = mip_sizes(1920, 1080);
        assert_eq!(sizes[0], (960, 540));
        assert_eq!(sizes[1], (480, 270));
        assert_eq!(sizes[2], (240, 135));
        assert_eq!(sizes[3], (120, 68));
        assert_eq!(sizes[4], (60, 34));
    }

    #[test]
    fn test_mip_chain_never_collapses() {
        for (w, h) in mip_sizes(3, 1) {
            assert!(w >= 1 && h >= 1);
        }
    }

    #[test]
    fn test_blur_wgsl_unrolls_taps() {
        let src = blur_wgsl(3);
        assert_eq!(src.matches("tap(in.uv + offset *").count(), 2);
        let src = blur_wgsl(11);
        assert_eq!(src.matches("tap(in.uv - offset *").count(), 10);
    }

    #[test]
    fn test_composite_wgsl_binds_every_level() {
        let src = composite_wgsl(&BloomSettings::default());
        for i in 0..MIP_COUNT {
            assert!(src.contains(&format!("var blur_{i}: texture_2d<f32>;")));
        }
        assert!(src.contains("@binding(6)\nvar linear_sampler: sampler;"));
        assert!(src.contains("1.2 * ("));
    }
}
