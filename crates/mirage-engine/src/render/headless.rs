use std::collections::HashMap;

use super::backend::{
    DepthStencilHandle, DrawCall, DrawTarget, FramebufferHandle, FramebufferStatus, GpuBackend,
    MeshHandle, MeshVertex, ProgramDesc, ProgramHandle, ProgramOutput, TextureDesc, TextureHandle,
    attachment_status,
};
use super::GpuError;

/// Creation and deletion counts per resource kind.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct ResourceCounts {
    pub textures_created: u32,
    pub textures_deleted: u32,
    pub depth_stencils_created: u32,
    pub depth_stencils_deleted: u32,
    pub framebuffers_created: u32,
    pub framebuffers_deleted: u32,
    pub programs_created: u32,
    pub programs_deleted: u32,
    pub meshes_created: u32,
    pub meshes_deleted: u32,
}

impl ResourceCounts {
    /// Every create has a matching delete.
    pub fn is_balanced(&self) -> bool {
        self.textures_created == self.textures_deleted
            && self.depth_stencils_created == self.depth_stencils_deleted
            && self.framebuffers_created == self.framebuffers_deleted
            && self.programs_created == self.programs_deleted
            && self.meshes_created == self.meshes_deleted
    }
}

/// A draw as seen by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub program: ProgramHandle,
    pub label: String,
    pub target: DrawTarget,
    pub uniforms: Vec<u8>,
    pub texture: Option<TextureHandle>,
    pub mesh: Option<MeshHandle>,
    pub cleared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordedOp {
    Clear { target: DrawTarget, color: [f32; 4] },
    Blit { src: FramebufferHandle, dst: DrawTarget },
}

#[derive(Debug, Clone)]
struct ProgramInfo {
    label: String,
    uniform_size: u64,
    sampled_texture: bool,
    output: ProgramOutput,
}

#[derive(Debug, Clone, Copy)]
struct FramebufferInfo {
    color: TextureHandle,
    depth: DepthStencilHandle,
}

/// GPU-less [`GpuBackend`] that only does bookkeeping.
///
/// Validates handles and draw calls the way a real backend would, counts
/// every create/delete, and records draws so scene logic can be tested
/// without a device.
#[derive(Debug)]
pub struct HeadlessBackend {
    surface: (u32, u32),
    max_dimension: u32,
    next_id: u32,

    textures: HashMap<TextureHandle, (u32, u32)>,
    depth_stencils: HashMap<DepthStencilHandle, (u32, u32)>,
    framebuffers: HashMap<FramebufferHandle, FramebufferInfo>,
    programs: HashMap<ProgramHandle, ProgramInfo>,
    meshes: HashMap<MeshHandle, usize>,

    counts: ResourceCounts,
    draws: Vec<RecordedDraw>,
    ops: Vec<RecordedOp>,

    fail_next_program: Option<String>,
    force_incomplete: bool,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: (width, height),
            max_dimension: 8192,
            next_id: 1,
            textures: HashMap::new(),
            depth_stencils: HashMap::new(),
            framebuffers: HashMap::new(),
            programs: HashMap::new(),
            meshes: HashMap::new(),
            counts: ResourceCounts::default(),
            draws: Vec::new(),
            ops: Vec::new(),
            fail_next_program: None,
            force_incomplete: false,
        }
    }

    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
    }

    pub fn set_max_dimension(&mut self, max: u32) {
        self.max_dimension = max;
    }

    /// The next `create_program` fails with a compile error carrying `message`.
    pub fn fail_next_program(&mut self, message: impl Into<String>) {
        self.fail_next_program = Some(message.into());
    }

    /// Reports every framebuffer as incomplete while set.
    pub fn force_incomplete(&mut self, on: bool) {
        self.force_incomplete = on;
    }

    pub fn counts(&self) -> ResourceCounts {
        self.counts
    }

    /// Number of handles of any kind currently alive.
    pub fn live_handles(&self) -> usize {
        self.textures.len()
            + self.depth_stencils.len()
            + self.framebuffers.len()
            + self.programs.len()
            + self.meshes.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&handle).copied()
    }

    /// Color attachment and its size.
    pub fn framebuffer_size(&self, handle: FramebufferHandle) -> Option<(u32, u32)> {
        let info = self.framebuffers.get(&handle)?;
        self.texture_size(info.color)
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    pub fn clear_records(&mut self) {
        self.draws.clear();
        self.ops.clear();
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_target(&self, target: DrawTarget) -> Result<(), GpuError> {
        match target {
            DrawTarget::Surface => Ok(()),
            DrawTarget::Framebuffer(fb) if self.framebuffers.contains_key(&fb) => Ok(()),
            DrawTarget::Framebuffer(fb) => Err(GpuError::UnknownHandle {
                kind: "framebuffer",
                id: fb.raw(),
            }),
        }
    }
}

impl GpuBackend for HeadlessBackend {
    fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_dimension
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle, GpuError> {
        if let Some(rgba) = desc.rgba {
            let expected = desc.width as usize * desc.height as usize * 4;
            if rgba.len() != expected {
                return Err(GpuError::ResourceCreation {
                    what: "texture",
                    message: format!("{} bytes for {expected}-byte image", rgba.len()),
                });
            }
        }
        let handle = TextureHandle::from_raw(self.next());
        self.textures.insert(handle, (desc.width, desc.height));
        self.counts.textures_created += 1;
        Ok(handle)
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_some() {
            self.counts.textures_deleted += 1;
        }
    }

    fn create_depth_stencil(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<DepthStencilHandle, GpuError> {
        let handle = DepthStencilHandle::from_raw(self.next());
        self.depth_stencils.insert(handle, (width, height));
        self.counts.depth_stencils_created += 1;
        Ok(handle)
    }

    fn delete_depth_stencil(&mut self, handle: DepthStencilHandle) {
        if self.depth_stencils.remove(&handle).is_some() {
            self.counts.depth_stencils_deleted += 1;
        }
    }

    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        depth: DepthStencilHandle,
    ) -> Result<FramebufferHandle, GpuError> {
        let handle = FramebufferHandle::from_raw(self.next());
        self.framebuffers.insert(handle, FramebufferInfo { color, depth });
        self.counts.framebuffers_created += 1;
        Ok(handle)
    }

    fn framebuffer_status(&self, handle: FramebufferHandle) -> FramebufferStatus {
        let Some(info) = self.framebuffers.get(&handle) else {
            return FramebufferStatus::Incomplete("unknown framebuffer".to_string());
        };
        if self.force_incomplete {
            return FramebufferStatus::Incomplete("forced".to_string());
        }
        attachment_status(
            self.textures.get(&info.color).copied(),
            self.depth_stencils.get(&info.depth).copied(),
            self.max_dimension,
        )
    }

    fn delete_framebuffer(&mut self, handle: FramebufferHandle) {
        if self.framebuffers.remove(&handle).is_some() {
            self.counts.framebuffers_deleted += 1;
        }
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, GpuError> {
        desc.validate()?;
        if let Some(message) = self.fail_next_program.take() {
            return Err(GpuError::ShaderCompile {
                label: desc.label.to_string(),
                message,
            });
        }
        let handle = ProgramHandle::from_raw(self.next());
        self.programs.insert(
            handle,
            ProgramInfo {
                label: desc.label.to_string(),
                uniform_size: desc.uniform_size,
                sampled_texture: desc.sampled_texture,
                output: desc.output,
            },
        );
        self.counts.programs_created += 1;
        Ok(handle)
    }

    fn delete_program(&mut self, handle: ProgramHandle) {
        if self.programs.remove(&handle).is_some() {
            self.counts.programs_deleted += 1;
        }
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
        let handle = MeshHandle::from_raw(self.next());
        self.meshes.insert(handle, indices.len());
        self.counts.meshes_created += 1;
        Ok(handle)
    }

    fn delete_mesh(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_some() {
            self.counts.meshes_deleted += 1;
        }
    }

    fn clear(&mut self, target: DrawTarget, color: [f32; 4]) -> Result<(), GpuError> {
        self.check_target(target)?;
        self.ops.push(RecordedOp::Clear { target, color });
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GpuError> {
        let info = self.programs.get(&call.program).ok_or(GpuError::UnknownHandle {
            kind: "program",
            id: call.program.raw(),
        })?;
        self.check_target(call.target)?;

        let label = info.label.clone();
        let target_output = match call.target {
            DrawTarget::Surface => ProgramOutput::Surface,
            DrawTarget::Framebuffer(_) => ProgramOutput::Offscreen,
        };
        if info.output != target_output {
            return Err(GpuError::InvalidProgramDesc {
                label,
                reason: format!("{:?} program drawn to {:?}", info.output, call.target),
            });
        }
        if call.uniforms.len() as u64 != info.uniform_size {
            return Err(GpuError::UniformSize {
                label,
                expected: info.uniform_size,
                actual: call.uniforms.len() as u64,
            });
        }
        if info.sampled_texture {
            let Some(texture) = call.texture else {
                return Err(GpuError::MissingTexture { label });
            };
            if !self.textures.contains_key(&texture) {
                return Err(GpuError::UnknownHandle {
                    kind: "texture",
                    id: texture.raw(),
                });
            }
            if let DrawTarget::Framebuffer(fb) = call.target {
                if self.framebuffers.get(&fb).is_some_and(|i| i.color == texture) {
                    return Err(GpuError::FeedbackLoop { label });
                }
            }
        }
        if let Some(mesh) = call.mesh {
            if !self.meshes.contains_key(&mesh) {
                return Err(GpuError::UnknownHandle {
                    kind: "mesh",
                    id: mesh.raw(),
                });
            }
        }

        self.draws.push(RecordedDraw {
            program: call.program,
            label,
            target: call.target,
            uniforms: call.uniforms.to_vec(),
            texture: call.texture,
            mesh: call.mesh,
            cleared: call.clear.is_some(),
        });
        Ok(())
    }

    fn blit(&mut self, src: FramebufferHandle, dst: DrawTarget) -> Result<(), GpuError> {
        self.check_target(DrawTarget::Framebuffer(src))?;
        self.check_target(dst)?;
        if dst == DrawTarget::Framebuffer(src) {
            return Err(GpuError::FeedbackLoop {
                label: "blit".to_string(),
            });
        }
        self.ops.push(RecordedOp::Blit { src, dst });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::VertexInput;

    fn sampled_program(gpu: &mut HeadlessBackend) -> ProgramHandle {
        gpu.create_program(&ProgramDesc {
            label: "sampler",
            wgsl: "vs_main fs_main",
            uniform_size: 16,
            sampled_texture: true,
            vertex_input: VertexInput::FullscreenTriangle,
            output: ProgramOutput::Offscreen,
            depth_test: false,
            cull_back_faces: false,
        })
        .unwrap()
    }

    fn framebuffer(gpu: &mut HeadlessBackend, w: u32, h: u32) -> (FramebufferHandle, TextureHandle) {
        let color = gpu
            .create_texture(&TextureDesc { label: "c", width: w, height: h, rgba: None })
            .unwrap();
        let depth = gpu.create_depth_stencil(w, h).unwrap();
        (gpu.create_framebuffer(color, depth).unwrap(), color)
    }

    #[test]
    fn counts_track_create_and_delete() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let t = gpu
            .create_texture(&TextureDesc { label: "t", width: 4, height: 4, rgba: None })
            .unwrap();
        assert!(!gpu.counts().is_balanced());
        gpu.delete_texture(t);
        gpu.delete_texture(t);
        assert_eq!(gpu.counts().textures_deleted, 1);
        assert!(gpu.counts().is_balanced());
    }

    #[test]
    fn sampling_the_written_target_is_rejected() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let program = sampled_program(&mut gpu);
        let (fb, color) = framebuffer(&mut gpu, 8, 8);
        let (_, other) = framebuffer(&mut gpu, 8, 8);
        let uniforms = [0u8; 16];

        let mut call = DrawCall {
            program,
            target: DrawTarget::Framebuffer(fb),
            uniforms: &uniforms,
            texture: Some(color),
            mesh: None,
            clear: None,
        };
        assert!(matches!(gpu.draw(&call), Err(GpuError::FeedbackLoop { .. })));
        call.texture = Some(other);
        assert!(gpu.draw(&call).is_ok());
        assert_eq!(gpu.draws().len(), 1);
    }

    #[test]
    fn uniform_size_is_checked() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let program = sampled_program(&mut gpu);
        let (fb, _) = framebuffer(&mut gpu, 8, 8);
        let (_, other) = framebuffer(&mut gpu, 8, 8);
        let err = gpu
            .draw(&DrawCall {
                program,
                target: DrawTarget::Framebuffer(fb),
                uniforms: &[0u8; 12],
                texture: Some(other),
                mesh: None,
                clear: None,
            })
            .unwrap_err();
        assert!(matches!(err, GpuError::UniformSize { expected: 16, actual: 12, .. }));
    }

    #[test]
    fn forced_incompleteness_and_mismatched_attachments() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let (fb, _) = framebuffer(&mut gpu, 8, 8);
        assert!(gpu.framebuffer_status(fb).is_complete());
        gpu.force_incomplete(true);
        assert!(!gpu.framebuffer_status(fb).is_complete());
        gpu.force_incomplete(false);

        let color = gpu
            .create_texture(&TextureDesc { label: "c", width: 8, height: 8, rgba: None })
            .unwrap();
        let depth = gpu.create_depth_stencil(4, 4).unwrap();
        let bad = gpu.create_framebuffer(color, depth).unwrap();
        assert!(!gpu.framebuffer_status(bad).is_complete());
    }

    #[test]
    fn injected_compile_failure_is_one_shot() {
        let mut gpu = HeadlessBackend::new(64, 64);
        gpu.fail_next_program("syntax error");
        let err = gpu
            .create_program(&ProgramDesc {
                label: "broken",
                wgsl: "vs_main fs_main",
                uniform_size: 16,
                sampled_texture: false,
                vertex_input: VertexInput::FullscreenTriangle,
                output: ProgramOutput::Surface,
                depth_test: false,
                cull_back_faces: false,
            })
            .unwrap_err();
        assert!(matches!(err, GpuError::ShaderCompile { ref label, .. } if label == "broken"));
        assert_eq!(gpu.counts().programs_created, 0);
    }
}
