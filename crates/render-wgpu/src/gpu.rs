use crate::frame::{FrameRecorder, PassLoad, PipelineKey, TextureGroupKey, pass_loads};
use crate::sampling::{mip_chain, sampler_descriptor};
use crate::shaders;
use crate::uniforms::{DrawUniforms, UNIFORM_STRIDE, WgpuTexture, pack_uniforms};
use station_common::Color;
use station_render::{
    CullMode, FillMode, Param, ParamValue, RasterizerState, RenderError, RenderTarget,
    SamplerState, ShaderHost, Technique, TextureImage, VertexFormat,
};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;
/// Sample count of multisampled passes; every adapter supports 4 for render formats.
const MSAA_SAMPLES: u32 = 4;

const FLAT_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Unorm8x4, 2 => Float32x3];
const TEXTURED_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

/// Vertex or index buffer owned by the caller. Vertex buffers carry their layout.
#[derive(Debug)]
pub struct WgpuBuffer {
    id: u32,
    format: Option<VertexFormat>,
}

impl WgpuBuffer {
    pub fn format(&self) -> Option<VertexFormat> {
        self.format
    }
}

struct UniformRing {
    buffer: wgpu::Buffer,
    group: wgpu::BindGroup,
    capacity: u64,
}

struct OffscreenTarget {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
}

/// Multisampled color and depth per target, resolved into the single-sample views.
struct MsaaTargets {
    screen_color: wgpu::TextureView,
    screen_depth: wgpu::TextureView,
    offscreen_color: wgpu::TextureView,
    offscreen_depth: wgpu::TextureView,
}

impl MsaaTargets {
    fn color(&self, target: RenderTarget) -> &wgpu::TextureView {
        match target {
            RenderTarget::Screen => &self.screen_color,
            RenderTarget::Offscreen => &self.offscreen_color,
        }
    }

    fn depth(&self, target: RenderTarget) -> &wgpu::TextureView {
        match target {
            RenderTarget::Screen => &self.screen_depth,
            RenderTarget::Offscreen => &self.offscreen_depth,
        }
    }
}

fn sample_count(rasterizer: RasterizerState) -> u32 {
    if rasterizer.multisample { MSAA_SAMPLES } else { 1 }
}

/// [`ShaderHost`] over a wgpu device.
///
/// Host calls are recorded into passes during the frame and encoded by
/// [`WgpuHost::finish_frame`], so the off-screen pass always completes before
/// the screen pass that samples it.
pub struct WgpuHost {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    size: (u32, u32),
    polygon_line: bool,
    warned_wireframe: bool,
    shader: wgpu::ShaderModule,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    samplers: HashMap<SamplerState, wgpu::Sampler>,
    texture_groups: HashMap<TextureGroupKey, wgpu::BindGroup>,
    textures: Vec<wgpu::TextureView>,
    buffers: HashMap<u32, wgpu::Buffer>,
    next_buffer: u32,
    uniforms: UniformRing,
    screen_depth: wgpu::TextureView,
    offscreen_depth: wgpu::TextureView,
    msaa: Option<MsaaTargets>,
    recorder: FrameRecorder,
}

impl WgpuHost {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let polygon_line = device.features().contains(wgpu::Features::POLYGON_MODE_LINE);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("station_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::STATION_SHADER.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("station_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let uniforms = Self::create_uniform_ring(&device, &uniform_layout, 64);

        let white = device.create_texture_with_data(
            &queue,
            &wgpu::TextureDescriptor {
                label: Some("white_texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &Color::WHITE.to_array(),
        );
        let offscreen = Self::create_offscreen(&device, surface_format, width, height);
        let textures = vec![white.create_view(&Default::default()), offscreen.color];
        let screen_depth = Self::create_depth_texture(&device, "screen_depth", width, height, 1);

        tracing::info!(
            "wgpu host ready: {width}x{height} {surface_format:?}, wireframe {}",
            if polygon_line { "supported" } else { "unsupported" }
        );

        Self {
            device,
            queue,
            surface_format,
            size: (width, height),
            polygon_line,
            warned_wireframe: false,
            shader,
            uniform_layout,
            texture_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            samplers: HashMap::new(),
            texture_groups: HashMap::new(),
            textures,
            buffers: HashMap::new(),
            next_buffer: 0,
            uniforms,
            screen_depth,
            offscreen_depth: offscreen.depth,
            msaa: None,
            recorder: FrameRecorder::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Recreates the size-dependent targets. The off-screen texture keeps its handle.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.msaa = None;
        self.screen_depth =
            Self::create_depth_texture(&self.device, "screen_depth", width, height, 1);
        let offscreen = Self::create_offscreen(&self.device, self.surface_format, width, height);
        self.textures[WgpuTexture::OFFSCREEN.0 as usize] = offscreen.color;
        self.offscreen_depth = offscreen.depth;
        self.texture_groups.retain(|key, _| {
            key.texture != WgpuTexture::OFFSCREEN && key.texture1 != WgpuTexture::OFFSCREEN
        });
    }

    /// Encodes and submits every pass recorded since [`ShaderHost::begin_frame`].
    pub fn finish_frame(&mut self, view: &wgpu::TextureView) -> Result<(), RenderError> {
        let (passes, blocks) = self.recorder.take();

        for draw in passes.iter().flat_map(|pass| &pass.draws) {
            self.ensure_pipeline(draw.pipeline);
            self.ensure_texture_group(draw.textures)?;
        }
        self.upload_uniforms(&blocks);
        if self.msaa.is_none() && passes.iter().any(|pass| pass.multisample) {
            self.msaa = Some(self.create_msaa_targets());
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("station_encoder"),
            });

        for (pass, load) in passes.iter().zip(pass_loads(&passes)) {
            if pass.draws.is_empty() && load == PassLoad::Load {
                continue;
            }
            let (resolved, single_depth, label) = match pass.target {
                RenderTarget::Screen => (view, &self.screen_depth, "screen_pass"),
                RenderTarget::Offscreen => (
                    &self.textures[WgpuTexture::OFFSCREEN.0 as usize],
                    &self.offscreen_depth,
                    "offscreen_pass",
                ),
            };
            let (color_view, resolve_target, depth_view) = match (&self.msaa, pass.multisample) {
                (Some(msaa), true) => (
                    msaa.color(pass.target),
                    Some(resolved),
                    msaa.depth(pass.target),
                ),
                _ => (resolved, None, single_depth),
            };
            let (color_load, depth_load) = match load {
                PassLoad::Clear(color) => {
                    let c = color.to_vec4().as_dvec4();
                    (
                        wgpu::LoadOp::Clear(wgpu::Color {
                            r: c.x,
                            g: c.y,
                            b: c.z,
                            a: c.w,
                        }),
                        wgpu::LoadOp::Clear(1.0),
                    )
                }
                PassLoad::Load => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &pass.draws {
                let missing = |what: &str| RenderError::Backend(format!("{what} missing at encode"));
                let pipeline = self
                    .pipelines
                    .get(&draw.pipeline)
                    .ok_or_else(|| missing("pipeline"))?;
                let textures = self
                    .texture_groups
                    .get(&draw.textures)
                    .ok_or_else(|| missing("texture group"))?;
                let vertices = self
                    .buffers
                    .get(&draw.vertices)
                    .ok_or_else(|| missing("vertex buffer"))?;
                let indices = self
                    .buffers
                    .get(&draw.indices)
                    .ok_or_else(|| missing("index buffer"))?;
                let offset = (draw.uniform_slot as u64 * UNIFORM_STRIDE) as u32;

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &self.uniforms.group, &[offset]);
                rpass.set_bind_group(1, textures, &[]);
                rpass.set_vertex_buffer(0, vertices.slice(..));
                rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn upload_uniforms(&mut self, blocks: &[DrawUniforms]) {
        if blocks.is_empty() {
            return;
        }
        let needed = blocks.len() as u64;
        if needed > self.uniforms.capacity {
            let capacity = needed.next_power_of_two();
            tracing::debug!("growing uniform ring to {capacity} draws");
            self.uniforms = Self::create_uniform_ring(&self.device, &self.uniform_layout, capacity);
        }
        self.queue
            .write_buffer(&self.uniforms.buffer, 0, &pack_uniforms(blocks));
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let polygon_mode = match key.rasterizer.fill {
            FillMode::Solid => wgpu::PolygonMode::Fill,
            FillMode::Wireframe if self.polygon_line => wgpu::PolygonMode::Line,
            FillMode::Wireframe => {
                if !self.warned_wireframe {
                    tracing::warn!("adapter lacks line polygon mode, wireframe draws filled");
                    self.warned_wireframe = true;
                }
                wgpu::PolygonMode::Fill
            }
        };
        let pipeline = self.create_pipeline(key, polygon_mode);
        self.pipelines.insert(key, pipeline);
    }

    fn create_pipeline(
        &self,
        key: PipelineKey,
        polygon_mode: wgpu::PolygonMode,
    ) -> wgpu::RenderPipeline {
        let (vertex_entry, attributes): (&str, &[wgpu::VertexAttribute]) = match key.format {
            VertexFormat::Flat => ("vs_flat", &FLAT_ATTRIBUTES),
            VertexFormat::Textured => ("vs_textured", &TEXTURED_ATTRIBUTES),
        };
        let fragment_entry = match key.technique {
            Technique::BasicPhongLightning => "fs_basic",
            Technique::Textured => "fs_textured",
            Technique::MultiTextured => "fs_multi",
        };
        let cull_mode = match key.rasterizer.cull {
            CullMode::None => None,
            CullMode::Back => Some(wgpu::Face::Back),
        };
        let label = format!("{}_{:?}", key.technique, key.format);
        tracing::debug!("creating pipeline {label} {:?}", key.rasterizer);

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some(vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: key.format.stride(),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some(fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode,
                    polygon_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: sample_count(key.rasterizer),
                    ..Default::default()
                },
                multiview: None,
                cache: None,
            })
    }

    fn ensure_sampler(&mut self, state: SamplerState) {
        if !self.samplers.contains_key(&state) {
            let sampler = self.device.create_sampler(&sampler_descriptor(&state));
            self.samplers.insert(state, sampler);
        }
    }

    fn ensure_texture_group(&mut self, key: TextureGroupKey) -> Result<(), RenderError> {
        if self.texture_groups.contains_key(&key) {
            return Ok(());
        }
        self.ensure_sampler(key.sampler);
        self.ensure_sampler(key.sampler1);

        let view = |texture: WgpuTexture| {
            self.textures
                .get(texture.0 as usize)
                .ok_or_else(|| RenderError::Backend(format!("unknown texture {}", texture.0)))
        };
        let sampler = |state: &SamplerState| {
            self.samplers
                .get(state)
                .ok_or_else(|| RenderError::Backend("sampler missing".into()))
        };
        let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view(key.texture)?),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler(&key.sampler)?),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(view(key.texture1)?),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler(&key.sampler1)?),
                },
            ],
        });
        self.texture_groups.insert(key, group);
        Ok(())
    }

    fn create_uniform_ring(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> UniformRing {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniforms"),
            size: capacity * UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_uniform_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SIZE),
                }),
            }],
        });
        UniformRing {
            buffer,
            group,
            capacity,
        }
    }

    fn create_msaa_targets(&self) -> MsaaTargets {
        let (width, height) = self.size;
        tracing::debug!("creating {MSAA_SAMPLES}x multisample targets {width}x{height}");
        let color = |label: &str| {
            self.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width: width.max(1),
                        height: height.max(1),
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: MSAA_SAMPLES,
                    dimension: wgpu::TextureDimension::D2,
                    format: self.surface_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        };
        let depth = |label: &str| {
            Self::create_depth_texture(&self.device, label, width, height, MSAA_SAMPLES)
        };
        MsaaTargets {
            screen_color: color("screen_msaa_color"),
            screen_depth: depth("screen_msaa_depth"),
            offscreen_color: color("offscreen_msaa_color"),
            offscreen_depth: depth("offscreen_msaa_depth"),
        }
    }

    fn create_offscreen(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> OffscreenTarget {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen_color"),
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
        });
        OffscreenTarget {
            color: texture.create_view(&Default::default()),
            depth: Self::create_depth_texture(device, "offscreen_depth", width, height, 1),
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        samples: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: samples,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn next_buffer_id(&mut self) -> u32 {
        let id = self.next_buffer;
        self.next_buffer += 1;
        id
    }
}

impl ShaderHost for WgpuHost {
    type Buffer = WgpuBuffer;
    type Texture = WgpuTexture;

    fn begin_frame(&mut self) {
        self.recorder.begin_frame();
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        format: VertexFormat,
        contents: &[u8],
    ) -> Result<WgpuBuffer, RenderError> {
        if contents.is_empty() || contents.len() as u64 % format.stride() != 0 {
            return Err(RenderError::Backend(format!(
                "{label}: {} bytes is not a whole number of {format:?} vertices",
                contents.len()
            )));
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = self.next_buffer_id();
        self.buffers.insert(id, buffer);
        Ok(WgpuBuffer {
            id,
            format: Some(format),
        })
    }

    fn create_index_buffer(
        &mut self,
        label: &str,
        indices: &[u16],
    ) -> Result<WgpuBuffer, RenderError> {
        if indices.is_empty() {
            return Err(RenderError::Backend(format!("{label}: no indices")));
        }
        // Buffer sizes must be a multiple of four bytes.
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&padded),
                usage: wgpu::BufferUsages::INDEX,
            });
        let id = self.next_buffer_id();
        self.buffers.insert(id, buffer);
        Ok(WgpuBuffer { id, format: None })
    }

    fn release_buffer(&mut self, buffer: WgpuBuffer) {
        if let Some(buffer) = self.buffers.remove(&buffer.id) {
            buffer.destroy();
        }
    }

    fn create_texture(
        &mut self,
        label: &str,
        image: &TextureImage,
    ) -> Result<WgpuTexture, RenderError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
            return Err(RenderError::Backend(format!(
                "{label}: {}x{} image with {} bytes",
                image.width,
                image.height,
                image.rgba.len()
            )));
        }
        let levels = mip_chain(image);
        let data: Vec<u8> = levels
            .iter()
            .flat_map(|(_, _, pixels)| pixels.iter().copied())
            .collect();
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: levels.len() as u32,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );
        let handle = WgpuTexture(self.textures.len() as u32);
        self.textures.push(texture.create_view(&Default::default()));
        tracing::debug!(
            "texture {label}: {}x{} with {} mips",
            image.width,
            image.height,
            levels.len()
        );
        Ok(handle)
    }

    fn technique(&self) -> Technique {
        self.recorder.technique
    }

    fn set_technique(&mut self, technique: Technique) -> Result<(), RenderError> {
        self.recorder.technique = technique;
        Ok(())
    }

    fn set_parameter(
        &mut self,
        param: Param,
        value: ParamValue<WgpuTexture>,
    ) -> Result<(), RenderError> {
        if let ParamValue::Texture(texture) = &value {
            if texture.0 as usize >= self.textures.len() {
                return Err(RenderError::Backend(format!("unknown texture {}", texture.0)));
            }
        }
        self.recorder.shading.set(param, value)
    }

    fn rasterizer(&self) -> RasterizerState {
        self.recorder.rasterizer
    }

    fn set_rasterizer(&mut self, state: RasterizerState) {
        self.recorder.rasterizer = state;
    }

    fn sampler(&self, slot: usize) -> SamplerState {
        self.recorder.samplers.get(slot).copied().unwrap_or_default()
    }

    fn set_sampler(&mut self, slot: usize, state: SamplerState) {
        match self.recorder.samplers.get_mut(slot) {
            Some(current) => *current = state,
            None => tracing::warn!("ignoring sampler slot {slot}"),
        }
    }

    fn set_render_target(&mut self, target: RenderTarget) -> Result<(), RenderError> {
        self.recorder.set_render_target(target)
    }

    fn offscreen_texture(&self) -> Result<WgpuTexture, RenderError> {
        self.recorder.offscreen_texture()
    }

    fn clear(&mut self, color: Color) {
        self.recorder.clear(color);
    }

    fn draw_indexed(
        &mut self,
        vertices: &WgpuBuffer,
        indices: &WgpuBuffer,
        index_count: u32,
    ) -> Result<(), RenderError> {
        let Some(format) = vertices.format else {
            return Err(RenderError::Backend("index buffer bound as vertices".into()));
        };
        if indices.format.is_some() {
            return Err(RenderError::Backend("vertex buffer bound as indices".into()));
        }
        if !self.buffers.contains_key(&vertices.id) || !self.buffers.contains_key(&indices.id) {
            return Err(RenderError::Backend("draw with a released buffer".into()));
        }
        self.recorder
            .record_draw(format, vertices.id, indices.id, index_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multisampled_rasterizer_picks_msaa_count() {
        assert_eq!(sample_count(RasterizerState::NORMAL), 1);
        assert_eq!(sample_count(RasterizerState::WIREFRAME.with_multisample(true)), MSAA_SAMPLES);
    }
}
