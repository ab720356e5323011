use super::backend::{
    DepthStencilHandle, DrawTarget, FramebufferHandle, FramebufferStatus, GpuBackend, TextureDesc,
    TextureHandle,
};
use super::GpuError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Handles {
    framebuffer: FramebufferHandle,
    depth_stencil: DepthStencilHandle,
    color: TextureHandle,
}

/// Off-screen render target: color texture, depth/stencil attachment and the
/// framebuffer object binding them.
///
/// Either all three handles are alive or none are. GPU objects are not
/// reclaimed on drop; call [`FrameBuffer::destroy`] before discarding.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    handles: Option<Handles>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    /// An unallocated framebuffer; `destroy` on it is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Allocates and verifies a `width`×`height` target.
    ///
    /// Any failure deletes whatever was already allocated before returning.
    pub fn create(gpu: &mut dyn GpuBackend, width: u32, height: u32) -> Result<Self, GpuError> {
        let color = gpu.create_texture(&TextureDesc {
            label: "framebuffer color",
            width,
            height,
            rgba: None,
        })?;

        let depth_stencil = match gpu.create_depth_stencil(width, height) {
            Ok(d) => d,
            Err(e) => {
                gpu.delete_texture(color);
                return Err(e);
            }
        };

        let framebuffer = match gpu.create_framebuffer(color, depth_stencil) {
            Ok(f) => f,
            Err(e) => {
                gpu.delete_depth_stencil(depth_stencil);
                gpu.delete_texture(color);
                return Err(e);
            }
        };

        if let FramebufferStatus::Incomplete(reason) = gpu.framebuffer_status(framebuffer) {
            gpu.delete_framebuffer(framebuffer);
            gpu.delete_depth_stencil(depth_stencil);
            gpu.delete_texture(color);
            return Err(GpuError::FramebufferIncomplete {
                width,
                height,
                reason,
            });
        }

        log::debug!("framebuffer {width}x{height} allocated");
        Ok(Self {
            handles: Some(Handles {
                framebuffer,
                depth_stencil,
                color,
            }),
            width,
            height,
        })
    }

    /// Releases all three handles. Safe to call repeatedly.
    pub fn destroy(&mut self, gpu: &mut dyn GpuBackend) {
        if let Some(h) = self.handles.take() {
            gpu.delete_framebuffer(h.framebuffer);
            gpu.delete_depth_stencil(h.depth_stencil);
            gpu.delete_texture(h.color);
            log::debug!("framebuffer {}x{} released", self.width, self.height);
        }
        self.width = 0;
        self.height = 0;
    }

    /// Destroys then creates at the new size. On failure `self` is left empty.
    pub fn recreate(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
    ) -> Result<(), GpuError> {
        self.destroy(gpu);
        *self = Self::create(gpu, width, height)?;
        Ok(())
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.handles.is_some()
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn handle(&self) -> Option<FramebufferHandle> {
        self.handles.map(|h| h.framebuffer)
    }

    pub fn color(&self) -> Option<TextureHandle> {
        self.handles.map(|h| h.color)
    }

    pub fn target(&self) -> Option<DrawTarget> {
        self.handle().map(DrawTarget::Framebuffer)
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        if self.handles.is_some() {
            log::warn!(
                "framebuffer {}x{} dropped without destroy; GPU handles leaked",
                self.width,
                self.height
            );
        }
    }
}
