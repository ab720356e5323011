use std::collections::HashMap;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::device::{DEPTH_STENCIL_FORMAT, Gpu, OFFSCREEN_FORMAT, SurfaceErrorAction, SurfaceFrame};

use super::backend::{
    DepthStencilHandle, DrawCall, DrawTarget, FramebufferHandle, FramebufferStatus, GpuBackend,
    MeshHandle, MeshVertex, ProgramDesc, ProgramHandle, ProgramOutput, TextureDesc, TextureHandle,
    VertexInput, attachment_status,
};
use super::GpuError;

struct TextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

struct DepthEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

#[derive(Clone, Copy)]
struct FramebufferEntry {
    color: TextureHandle,
    depth: DepthStencilHandle,
}

struct ProgramEntry {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    ubo: wgpu::Buffer,
    uniform_size: u64,
    sampled_texture: bool,
    output: ProgramOutput,
}

struct MeshEntry {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct BlitPipelines {
    bind_group_layout: wgpu::BindGroupLayout,
    offscreen: wgpu::RenderPipeline,
    surface: wgpu::RenderPipeline,
}

/// [`GpuBackend`] on top of wgpu.
///
/// Every draw records into its own encoder and is submitted immediately, so
/// per-program uniform buffers can be rewritten between draws. Surface draws
/// are only valid between [`WgpuBackend::begin_frame`] and
/// [`WgpuBackend::end_frame`].
pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,
    sampler: wgpu::Sampler,
    next_id: u32,

    textures: HashMap<TextureHandle, TextureEntry>,
    depth_stencils: HashMap<DepthStencilHandle, DepthEntry>,
    framebuffers: HashMap<FramebufferHandle, FramebufferEntry>,
    programs: HashMap<ProgramHandle, ProgramEntry>,
    meshes: HashMap<MeshHandle, MeshEntry>,

    frame: Option<SurfaceFrame>,
    blit: Option<BlitPipelines>,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let sampler = gpu.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mirage linear sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            gpu,
            sampler,
            next_id: 1,
            textures: HashMap::new(),
            depth_stencils: HashMap::new(),
            framebuffers: HashMap::new(),
            programs: HashMap::new(),
            meshes: HashMap::new(),
            frame: None,
            blit: None,
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Acquires the surface texture for this frame.
    pub fn begin_frame(&mut self) -> Result<(), SurfaceErrorAction> {
        if self.frame.is_some() {
            return Ok(());
        }
        self.frame = Some(self.gpu.acquire()?);
        Ok(())
    }

    /// Presents the frame acquired by `begin_frame`, if any.
    pub fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.gpu.present(frame);
        }
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_extent(&self, what: &'static str, width: u32, height: u32) -> Result<(), GpuError> {
        let max = self.gpu.max_texture_dimension();
        if width == 0 || height == 0 || width > max || height > max {
            return Err(GpuError::ResourceCreation {
                what,
                message: format!("{width}x{height} outside 1..={max}"),
            });
        }
        Ok(())
    }

    fn target_views(
        &self,
        target: DrawTarget,
    ) -> Result<(&wgpu::TextureView, Option<&wgpu::TextureView>), GpuError> {
        match target {
            DrawTarget::Surface => self
                .frame
                .as_ref()
                .map(|f| (&f.view, None))
                .ok_or(GpuError::NoActiveFrame),
            DrawTarget::Framebuffer(fb) => {
                let entry = self.framebuffers.get(&fb).ok_or(GpuError::UnknownHandle {
                    kind: "framebuffer",
                    id: fb.raw(),
                })?;
                let color = self.textures.get(&entry.color).ok_or(GpuError::UnknownHandle {
                    kind: "texture",
                    id: entry.color.raw(),
                })?;
                let depth = self.depth_stencils.get(&entry.depth).ok_or(GpuError::UnknownHandle {
                    kind: "depth/stencil",
                    id: entry.depth.raw(),
                })?;
                Ok((&color.view, Some(&depth.view)))
            }
        }
    }

    fn texture_view(&self, handle: TextureHandle) -> Result<&wgpu::TextureView, GpuError> {
        self.textures
            .get(&handle)
            .map(|t| &t.view)
            .ok_or(GpuError::UnknownHandle {
                kind: "texture",
                id: handle.raw(),
            })
    }

    fn writes_texture(&self, target: DrawTarget, texture: TextureHandle) -> bool {
        match target {
            DrawTarget::Surface => false,
            DrawTarget::Framebuffer(fb) => self.framebuffers.get(&fb).is_some_and(|e| e.color == texture),
        }
    }

    fn ensure_blit(&mut self) {
        if self.blit.is_some() {
            return;
        }
        let device = self.gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mirage blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mirage blit bgl"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mirage blit pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let build = |format: wgpu::TextureFormat, depth: Option<wgpu::DepthStencilState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mirage blit pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: depth,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let offscreen = build(OFFSCREEN_FORMAT, Some(depth_state(false)));
        let surface = build(self.gpu.surface_format(), None);

        self.blit = Some(BlitPipelines {
            bind_group_layout,
            offscreen,
            surface,
        });
    }
}

impl GpuBackend for WgpuBackend<'_> {
    fn surface_size(&self) -> (u32, u32) {
        self.gpu.surface_size()
    }

    fn max_texture_dimension(&self) -> u32 {
        self.gpu.max_texture_dimension()
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle, GpuError> {
        self.check_extent("texture", desc.width, desc.height)?;
        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        if let Some(rgba) = desc.rgba {
            let expected = desc.width as usize * desc.height as usize * 4;
            if rgba.len() != expected {
                return Err(GpuError::ResourceCreation {
                    what: "texture",
                    message: format!("{} bytes for {expected}-byte image", rgba.len()),
                });
            }
        }

        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        if let Some(rgba) = desc.rgba {
            self.gpu.queue().write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(desc.width * 4),
                    rows_per_image: Some(desc.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = TextureHandle::from_raw(self.next());
        self.textures.insert(
            handle,
            TextureEntry {
                texture,
                view,
                size: (desc.width, desc.height),
            },
        );
        Ok(handle)
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        if let Some(entry) = self.textures.remove(&handle) {
            entry.texture.destroy();
        }
    }

    fn create_depth_stencil(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<DepthStencilHandle, GpuError> {
        self.check_extent("depth/stencil", width, height)?;
        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("mirage depth/stencil"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = DepthStencilHandle::from_raw(self.next());
        self.depth_stencils.insert(
            handle,
            DepthEntry {
                texture,
                view,
                size: (width, height),
            },
        );
        Ok(handle)
    }

    fn delete_depth_stencil(&mut self, handle: DepthStencilHandle) {
        if let Some(entry) = self.depth_stencils.remove(&handle) {
            entry.texture.destroy();
        }
    }

    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        depth: DepthStencilHandle,
    ) -> Result<FramebufferHandle, GpuError> {
        if !self.textures.contains_key(&color) {
            return Err(GpuError::UnknownHandle {
                kind: "texture",
                id: color.raw(),
            });
        }
        if !self.depth_stencils.contains_key(&depth) {
            return Err(GpuError::UnknownHandle {
                kind: "depth/stencil",
                id: depth.raw(),
            });
        }
        let handle = FramebufferHandle::from_raw(self.next());
        self.framebuffers.insert(handle, FramebufferEntry { color, depth });
        Ok(handle)
    }

    fn framebuffer_status(&self, handle: FramebufferHandle) -> FramebufferStatus {
        let Some(entry) = self.framebuffers.get(&handle) else {
            return FramebufferStatus::Incomplete("unknown framebuffer".to_string());
        };
        attachment_status(
            self.textures.get(&entry.color).map(|t| t.size),
            self.depth_stencils.get(&entry.depth).map(|d| d.size),
            self.gpu.max_texture_dimension(),
        )
    }

    fn delete_framebuffer(&mut self, handle: FramebufferHandle) {
        self.framebuffers.remove(&handle);
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, GpuError> {
        desc.validate()?;
        let device = self.gpu.device();

        // Compile and link inside a validation scope so a bad shader comes
        // back as an error instead of the default panic handler.
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
        });

        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(desc.uniform_size),
            },
            count: None,
        }];
        if desc.sampled_texture {
            entries.push(texture_entry(1));
            entries.push(sampler_entry(2));
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(desc.label),
            entries: &entries,
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let mesh_layout = [MeshVertex::layout()];
        let buffers: &[wgpu::VertexBufferLayout<'_>] = match desc.vertex_input {
            VertexInput::FullscreenTriangle => &[],
            VertexInput::Mesh => &mesh_layout,
        };

        let (format, depth_stencil) = match desc.output {
            ProgramOutput::Offscreen => (OFFSCREEN_FORMAT, Some(depth_state(desc.depth_test))),
            ProgramOutput::Surface => (self.gpu.surface_format(), None),
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_back_faces.then_some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(GpuError::ShaderCompile {
                label: desc.label.to_string(),
                message: err.to_string(),
            });
        }

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(desc.label),
            size: desc.uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let handle = ProgramHandle::from_raw(self.next());
        self.programs.insert(
            handle,
            ProgramEntry {
                label: desc.label.to_string(),
                pipeline,
                bind_group_layout,
                ubo,
                uniform_size: desc.uniform_size,
                sampled_texture: desc.sampled_texture,
                output: desc.output,
            },
        );
        log::debug!("program `{}` built", desc.label);
        Ok(handle)
    }

    fn delete_program(&mut self, handle: ProgramHandle) {
        self.programs.remove(&handle);
    }

    fn create_mesh(
        &mut self,
        vertices: &[MeshVertex],
        indices: &[u16],
    ) -> Result<MeshHandle, GpuError> {
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(GpuError::ResourceCreation {
                what: "mesh",
                message: format!("index {bad} out of range for {} vertices", vertices.len()),
            });
        }
        let device = self.gpu.device();
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mirage mesh vbo"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        // Index buffers must be a multiple of 4 bytes.
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mirage mesh ibo"),
            contents: bytemuck::cast_slice(&padded),
            usage: wgpu::BufferUsages::INDEX,
        });
        let handle = MeshHandle::from_raw(self.next());
        self.meshes.insert(
            handle,
            MeshEntry {
                vbo,
                ibo,
                index_count: indices.len() as u32,
            },
        );
        Ok(handle)
    }

    fn delete_mesh(&mut self, handle: MeshHandle) {
        self.meshes.remove(&handle);
    }

    fn clear(&mut self, target: DrawTarget, color: [f32; 4]) -> Result<(), GpuError> {
        let (color_view, depth_view) = self.target_views(target)?;
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mirage clear encoder"),
            });
        drop(begin_pass(&mut encoder, "mirage clear pass", color_view, depth_view, Some(color)));
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GpuError> {
        let program = self.programs.get(&call.program).ok_or(GpuError::UnknownHandle {
            kind: "program",
            id: call.program.raw(),
        })?;

        let target_output = match call.target {
            DrawTarget::Surface => ProgramOutput::Surface,
            DrawTarget::Framebuffer(_) => ProgramOutput::Offscreen,
        };
        if program.output != target_output {
            return Err(GpuError::InvalidProgramDesc {
                label: program.label.clone(),
                reason: format!("{:?} program drawn to {:?}", program.output, call.target),
            });
        }
        if call.uniforms.len() as u64 != program.uniform_size {
            return Err(GpuError::UniformSize {
                label: program.label.clone(),
                expected: program.uniform_size,
                actual: call.uniforms.len() as u64,
            });
        }

        let texture_view = if program.sampled_texture {
            let texture = call.texture.ok_or_else(|| GpuError::MissingTexture {
                label: program.label.clone(),
            })?;
            if self.writes_texture(call.target, texture) {
                return Err(GpuError::FeedbackLoop {
                    label: program.label.clone(),
                });
            }
            Some(self.texture_view(texture)?)
        } else {
            None
        };

        let mesh = match call.mesh {
            Some(handle) => Some(self.meshes.get(&handle).ok_or(GpuError::UnknownHandle {
                kind: "mesh",
                id: handle.raw(),
            })?),
            None => None,
        };

        let (color_view, depth_view) = self.target_views(call.target)?;
        let device = self.gpu.device();
        let queue = self.gpu.queue();

        queue.write_buffer(&program.ubo, 0, call.uniforms);

        let mut bind_entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: program.ubo.as_entire_binding(),
        }];
        if let Some(view) = texture_view {
            bind_entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            });
            bind_entries.push(wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&program.label),
            layout: &program.bind_group_layout,
            entries: &bind_entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mirage draw encoder"),
        });
        {
            let mut pass = begin_pass(&mut encoder, &program.label, color_view, depth_view, call.clear);
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            match mesh {
                Some(mesh) => {
                    pass.set_vertex_buffer(0, mesh.vbo.slice(..));
                    pass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
                None => pass.draw(0..3, 0..1),
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn blit(&mut self, src: FramebufferHandle, dst: DrawTarget) -> Result<(), GpuError> {
        if dst == DrawTarget::Framebuffer(src) {
            return Err(GpuError::FeedbackLoop {
                label: "blit".to_string(),
            });
        }
        self.ensure_blit();
        let Some(blit) = self.blit.as_ref() else {
            return Ok(());
        };

        let color = self
            .framebuffers
            .get(&src)
            .map(|e| e.color)
            .ok_or(GpuError::UnknownHandle {
                kind: "framebuffer",
                id: src.raw(),
            })?;
        let src_view = self.texture_view(color)?;
        let (color_view, depth_view) = self.target_views(dst)?;
        let pipeline = match dst {
            DrawTarget::Surface => &blit.surface,
            DrawTarget::Framebuffer(_) => &blit.offscreen,
        };

        let device = self.gpu.device();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mirage blit bind group"),
            layout: &blit.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(src_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mirage blit encoder"),
        });
        {
            let mut pass = begin_pass(&mut encoder, "mirage blit pass", color_view, depth_view, None);
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    color: &wgpu::TextureView,
    depth: Option<&wgpu::TextureView>,
    clear: Option<[f32; 4]>,
) -> wgpu::RenderPass<'e> {
    let load = match clear {
        Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }),
        None => wgpu::LoadOp::Load,
    };
    let (depth_load, stencil_load) = if clear.is_some() {
        (wgpu::LoadOp::Clear(1.0), wgpu::LoadOp::Clear(0))
    } else {
        (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
    };

    encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: depth.map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: stencil_load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
}

fn depth_state(test: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled: test,
        depth_compare: if test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
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
