use bytemuck::{Pod, Zeroable};

use super::GpuError;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(id: u32) -> Self {
                Self(id)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Sampled RGBA color texture, linear filtering, no mipmaps.
    TextureHandle
);
handle!(
    /// Combined depth/stencil attachment.
    DepthStencilHandle
);
handle!(
    /// Color texture + depth/stencil pair usable as a render target.
    FramebufferHandle
);
handle!(ProgramHandle);
handle!(MeshHandle);

/// Result of a framebuffer completeness check.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FramebufferStatus {
    Complete,
    Incomplete(String),
}

impl FramebufferStatus {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, FramebufferStatus::Complete)
    }
}

/// Where a draw writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawTarget {
    /// The visible surface of the current frame.
    Surface,
    Framebuffer(FramebufferHandle),
}

/// Which kind of target a program renders into; fixes its color format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProgramOutput {
    /// Off-screen framebuffers (color + depth/stencil).
    Offscreen,
    /// The visible surface (color only).
    Surface,
}

/// Vertex input of a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexInput {
    /// No vertex buffers; the vertex shader synthesizes a full-screen
    /// triangle from `vertex_index` (three vertices).
    FullscreenTriangle,
    /// Indexed [`MeshVertex`] geometry.
    Mesh,
}

/// Everything needed to build one render program.
///
/// The WGSL source must provide `vs_main` and `fs_main`. Bindings in group 0:
/// `@binding(0)` uniform block of `uniform_size` bytes; when
/// `sampled_texture` is set, `@binding(1)` a 2D texture and `@binding(2)` a
/// sampler.
#[derive(Debug, Clone)]
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub wgsl: &'a str,
    pub uniform_size: u64,
    pub sampled_texture: bool,
    pub vertex_input: VertexInput,
    pub output: ProgramOutput,
    pub depth_test: bool,
    pub cull_back_faces: bool,
}

impl ProgramDesc<'_> {
    pub fn validate(&self) -> Result<(), GpuError> {
        let invalid = |reason: &str| GpuError::InvalidProgramDesc {
            label: self.label.to_string(),
            reason: reason.to_string(),
        };
        if self.uniform_size == 0 || self.uniform_size % 16 != 0 {
            return Err(invalid("uniform size must be a non-zero multiple of 16"));
        }
        if self.depth_test && self.output == ProgramOutput::Surface {
            return Err(invalid("surface programs have no depth attachment"));
        }
        if !self.wgsl.contains("vs_main") || !self.wgsl.contains("fs_main") {
            return Err(invalid("missing vs_main/fs_main entry points"));
        }
        Ok(())
    }
}

/// Interleaved mesh vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// Free per-vertex tag (e.g. a face index) passed through to the shader.
    pub tag: f32,
}

impl MeshVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2, // uv
        2 => Float32    // tag
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Initial contents and size of a color texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows; `None` leaves the contents undefined.
    pub rgba: Option<&'a [u8]>,
}

/// One draw submission.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub program: ProgramHandle,
    pub target: DrawTarget,
    /// Raw uniform block; length must equal the program's `uniform_size`.
    pub uniforms: &'a [u8],
    pub texture: Option<TextureHandle>,
    /// `None` draws the full-screen triangle.
    pub mesh: Option<MeshHandle>,
    /// Clears color (and depth, when present) before drawing.
    pub clear: Option<[f32; 4]>,
}

/// GPU resource and submission seam between scenes and a graphics API.
///
/// All calls happen on the render thread. Handles are only meaningful to
/// the backend that created them.
pub trait GpuBackend {
    fn surface_size(&self) -> (u32, u32);

    /// Largest texture edge the backend can allocate.
    fn max_texture_dimension(&self) -> u32;

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle, GpuError>;
    fn delete_texture(&mut self, handle: TextureHandle);

    fn create_depth_stencil(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<DepthStencilHandle, GpuError>;
    fn delete_depth_stencil(&mut self, handle: DepthStencilHandle);

    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        depth: DepthStencilHandle,
    ) -> Result<FramebufferHandle, GpuError>;
    fn framebuffer_status(&self, handle: FramebufferHandle) -> FramebufferStatus;
    /// Releases the framebuffer object only; its attachments stay alive.
    fn delete_framebuffer(&mut self, handle: FramebufferHandle);

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, GpuError>;
    fn delete_program(&mut self, handle: ProgramHandle);

    fn create_mesh(
        &mut self,
        vertices: &[MeshVertex],
        indices: &[u16],
    ) -> Result<MeshHandle, GpuError>;
    fn delete_mesh(&mut self, handle: MeshHandle);

    fn clear(&mut self, target: DrawTarget, color: [f32; 4]) -> Result<(), GpuError>;

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GpuError>;

    /// Copies the color attachment of `src` onto `dst`, rescaling to fit.
    fn blit(&mut self, src: FramebufferHandle, dst: DrawTarget) -> Result<(), GpuError>;
}

/// Checks shared by every backend: both attachments present, equal,
/// non-zero extents within `max_dimension`.
pub fn attachment_status(
    color: Option<(u32, u32)>,
    depth: Option<(u32, u32)>,
    max_dimension: u32,
) -> FramebufferStatus {
    let (Some(color), Some(depth)) = (color, depth) else {
        return FramebufferStatus::Incomplete("missing attachment".to_string());
    };
    if color != depth {
        return FramebufferStatus::Incomplete(format!(
            "attachment sizes differ ({}x{} color, {}x{} depth)",
            color.0, color.1, depth.0, depth.1
        ));
    }
    let (w, h) = color;
    if w == 0 || h == 0 {
        return FramebufferStatus::Incomplete("zero-sized attachment".to_string());
    }
    if w > max_dimension || h > max_dimension {
        return FramebufferStatus::Incomplete(format!(
            "{w}x{h} exceeds the {max_dimension} texel limit"
        ));
    }
    FramebufferStatus::Complete
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(output: ProgramOutput, depth_test: bool, uniform_size: u64) -> ProgramDesc<'static> {
        ProgramDesc {
            label: "test",
            wgsl: "fn vs_main() {} fn fs_main() {}",
            uniform_size,
            sampled_texture: false,
            vertex_input: VertexInput::FullscreenTriangle,
            output,
            depth_test,
            cull_back_faces: false,
        }
    }

    #[test]
    fn program_desc_validation() {
        assert!(desc(ProgramOutput::Offscreen, true, 64).validate().is_ok());
        assert!(desc(ProgramOutput::Surface, true, 64).validate().is_err());
        assert!(desc(ProgramOutput::Surface, false, 0).validate().is_err());
        assert!(desc(ProgramOutput::Surface, false, 20).validate().is_err());
    }

    #[test]
    fn attachment_status_rules() {
        assert!(attachment_status(Some((4, 4)), Some((4, 4)), 8).is_complete());
        assert!(!attachment_status(Some((4, 4)), None, 8).is_complete());
        assert!(!attachment_status(Some((4, 4)), Some((4, 2)), 8).is_complete());
        assert!(!attachment_status(Some((0, 4)), Some((0, 4)), 8).is_complete());
        assert!(!attachment_status(Some((16, 4)), Some((16, 4)), 8).is_complete());
    }

    #[test]
    fn mesh_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
    }
}
