//! The glow compositor.
//!
//! Particles are rendered into an offscreen scene texture; this module
//! owns that texture and turns it into the presented frame. The composite
//! is: blit the scene to the swapchain, then additively layer two blurred,
//! brightness-boosted copies of it (a wide ~8 px pass and a tight ~4 px
//! pass). Cheap thin strokes come out of it with a luminous halo.
//!
//! The exact pixel output is intentionally approximate; the contract is
//! "two-pass blur-and-additive-composite", not a specific kernel.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Blur radius of the wide halo pass, in pixels.
const WIDE_RADIUS: f32 = 8.0;
/// Blur radius of the tight halo pass, in pixels.
const TIGHT_RADIUS: f32 = 4.0;
/// Brightness boost applied by each blur pass.
const GLOW_GAIN: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BlurParams {
    texel: [f32; 2],
    radius: f32,
    gain: f32,
}

impl BlurParams {
    fn new(width: u32, height: u32, radius: f32) -> Self {
        Self {
            texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            radius,
            gain: GLOW_GAIN,
        }
    }
}

/// GPU resources for the glow composite.
pub struct GlowState {
    /// Offscreen scene render target.
    pub texture: wgpu::Texture,
    /// View into the scene texture.
    pub view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    blit_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    wide_params: wgpu::Buffer,
    tight_params: wgpu::Buffer,
    wide_bind_group: wgpu::BindGroup,
    tight_bind_group: wgpu::BindGroup,
}

impl GlowState {
    /// Create the glow compositor and its offscreen scene target.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let texture = create_scene_texture(device, width, height, surface_format);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let wide_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wide Blur Params"),
            contents: bytemuck::bytes_of(&BlurParams::new(width, height, WIDE_RADIUS)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let tight_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tight Blur Params"),
            contents: bytemuck::bytes_of(&BlurParams::new(width, height, TIGHT_RADIUS)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Glow Bind Group Layout"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Glow Shader"),
            source: wgpu::ShaderSource::Wgsl(GLOW_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glow Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let blit_pipeline = create_fullscreen_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_blit",
            None,
            surface_format,
            "Glow Blit Pipeline",
        );
        let blur_pipeline = create_fullscreen_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_blur",
            Some(additive_blend()),
            surface_format,
            "Glow Blur Pipeline",
        );

        let (wide_bind_group, tight_bind_group) = create_bind_groups(
            device,
            &bind_group_layout,
            &view,
            &sampler,
            &wide_params,
            &tight_params,
        );

        Self {
            texture,
            view,
            sampler,
            bind_group_layout,
            blit_pipeline,
            blur_pipeline,
            wide_params,
            tight_params,
            wide_bind_group,
            tight_bind_group,
        }
    }

    /// Recreate the scene texture and rebind after a surface resize.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) {
        self.texture = create_scene_texture(device, width, height, surface_format);
        self.view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        queue.write_buffer(
            &self.wide_params,
            0,
            bytemuck::bytes_of(&BlurParams::new(width, height, WIDE_RADIUS)),
        );
        queue.write_buffer(
            &self.tight_params,
            0,
            bytemuck::bytes_of(&BlurParams::new(width, height, TIGHT_RADIUS)),
        );

        let (wide, tight) = create_bind_groups(
            device,
            &self.bind_group_layout,
            &self.view,
            &self.sampler,
            &self.wide_params,
            &self.tight_params,
        );
        self.wide_bind_group = wide;
        self.tight_bind_group = tight;
    }

    /// Composite the scene texture onto `target`: blit, then the wide and
    /// tight additive blur passes.
    pub fn compose(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Glow Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.wide_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        for bind_group in [&self.wide_bind_group, &self.tight_bind_group] {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Glow Blur Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.blur_pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }
}

fn create_scene_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Scene Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

fn create_bind_groups(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    wide_params: &wgpu::Buffer,
    tight_params: &wgpu::Buffer,
) -> (wgpu::BindGroup, wgpu::BindGroup) {
    let make = |params: &wgpu::Buffer, label: &str| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    };
    (
        make(wide_params, "Wide Glow Bind Group"),
        make(tight_params, "Tight Glow Bind Group"),
    )
}

fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    blend: Option<wgpu::BlendState>,
    surface_format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend,
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

/// The canvas "lighter" composite: plain additive blending.
fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

const GLOW_SHADER: &str = r#"
struct BlurParams {
    texel: vec2<f32>,
    radius: f32,
    gain: f32,
};

@group(0) @binding(0)
var scene: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: BlurParams;

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

@fragment
fn fs_blit(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(scene, scene_sampler, in.uv);
}

// Gaussian tap grid spread across the configured radius, boosted by the
// gain and composited additively by the pipeline's blend state.
@fragment
fn fs_blur(in: VertexOutput) -> @location(0) vec4<f32> {
    var sum = vec4<f32>(0.0);
    var total = 0.0;
    for (var i = -3; i <= 3; i++) {
        for (var j = -3; j <= 3; j++) {
            let offset = vec2<f32>(f32(i), f32(j)) * (params.radius / 3.0) * params.texel;
            let weight = exp(-f32(i * i + j * j) / 4.5);
            sum += textureSample(scene, scene_sampler, in.uv + offset) * weight;
            total += weight;
        }
    }
    let color = sum / total * params.gain;
    return vec4<f32>(color.rgb, 1.0);
}
"#;
