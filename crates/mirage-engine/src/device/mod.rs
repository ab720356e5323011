//! GPU device + surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the Surface
//! (swapchain) and acquires/presents surface textures. Resource creation and
//! draw submission live behind [`crate::render::GpuBackend`].

mod gpu;
mod init;

pub use gpu::{DEPTH_STENCIL_FORMAT, Gpu, OFFSCREEN_FORMAT, SurfaceErrorAction, SurfaceFrame};
pub use init::GpuInit;
