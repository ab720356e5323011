//! GPU resources and draw submission.
//!
//! Scenes talk to a [`GpuBackend`] through opaque handles. [`WgpuBackend`]
//! drives a real device; [`HeadlessBackend`] records calls so scene logic can
//! be exercised without one.
//!
//! Convention:
//! - every off-screen target is an RGBA8 color texture plus a 24-bit depth /
//!   8-bit stencil attachment of the same size
//! - a program samples at most one texture, at bindings 1 (texture) and 2
//!   (sampler); binding 0 is its uniform block

mod backend;
mod error;
mod framebuffer;
mod headless;
mod ping_pong;
mod wgpu_backend;

pub use backend::{
    DepthStencilHandle, DrawCall, DrawTarget, FramebufferHandle, FramebufferStatus, GpuBackend,
    MeshHandle, MeshVertex, ProgramDesc, ProgramHandle, ProgramOutput, TextureDesc, TextureHandle,
    VertexInput, attachment_status,
};
pub use error::GpuError;
pub use framebuffer::FrameBuffer;
pub use headless::{HeadlessBackend, RecordedDraw, RecordedOp, ResourceCounts};
pub use ping_pong::PingPong;
pub use wgpu_backend::WgpuBackend;

pub use crate::device::{DEPTH_STENCIL_FORMAT, OFFSCREEN_FORMAT};
