use std::time::Instant;

use thiserror::Error;

use crate::input::{Key, TouchEvent};
use crate::render::{GpuBackend, GpuError};
use crate::sensor::ScreenOrientation;

use super::LifecycleState;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("scene is not ready (state {0:?})")]
    NotReady(LifecycleState),

    #[error("scene was torn down")]
    TornDown,
}

/// Renderer-style contract implemented by every scene.
///
/// All methods run on the render thread. GPU setup failures are fatal for the
/// instance: the caller reports them and drops the scene; nothing retries.
pub trait Scene {
    fn name(&self) -> &'static str;

    /// Scene became visible; start sensor delivery.
    fn on_attach(&mut self);

    /// Scene is going away; stop sensor delivery and release GPU resources.
    fn on_detach(&mut self, gpu: &mut dyn GpuBackend);

    /// One-time GPU setup (programs, meshes, initial framebuffers).
    fn on_surface_created(&mut self, gpu: &mut dyn GpuBackend) -> Result<(), SceneError>;

    /// Rebuild resolution-dependent resources.
    fn on_surface_changed(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
    ) -> Result<(), SceneError>;

    /// Advance, integrate input, then draw one frame.
    fn on_draw_frame(&mut self, gpu: &mut dyn GpuBackend, now: Instant) -> Result<(), SceneError>;

    fn on_touch_event(&mut self, event: &TouchEvent);

    fn on_orientation_change(&mut self, orientation: ScreenOrientation);

    /// Return to the home pose with the clock and sensor baseline cleared.
    fn reset(&mut self);

    fn on_key(&mut self, key: Key) {
        let _ = key;
    }
}
