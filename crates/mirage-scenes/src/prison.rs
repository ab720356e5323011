use std::time::Instant;

use mirage_engine::core::{Lifecycle, Scene, SceneError};
use mirage_engine::input::{Key, TouchEvent};
use mirage_engine::render::{
    DrawCall, DrawTarget, FrameBuffer, GpuBackend, ProgramDesc, ProgramHandle, ProgramOutput,
    VertexInput,
};
use mirage_engine::sensor::{RotationFeed, RotationSensor, ScreenOrientation};

use crate::FlyCamera;
use crate::config::PrisonConfig;
use crate::flight::FlightRig;
use crate::options::ResolutionScale;
use crate::uniforms::RaymarchUniforms;

const SHADER: &str = concat!(
    include_str!("shaders/raymarch_common.wgsl"),
    include_str!("shaders/prison.wgsl"),
);

/// Flight through the infinite menger lattice.
///
/// Raymarched into an off-screen target at a reduced resolution, then
/// stretched onto the surface. Flying into a bar resets the flight.
pub struct MengerPrisonScene {
    config: PrisonConfig,
    scale: ResolutionScale,
    rig: FlightRig,
    lifecycle: Lifecycle,

    program: Option<ProgramHandle>,
    target: FrameBuffer,
    surface: (u32, u32),
    resets: u32,
}

impl MengerPrisonScene {
    pub fn new(config: PrisonConfig, scale: ResolutionScale, feed: RotationFeed) -> Self {
        let rig = FlightRig::new(&config.flight, config.home(), feed);
        Self {
            config,
            scale,
            rig,
            lifecycle: Lifecycle::new(),
            program: None,
            target: FrameBuffer::empty(),
            surface: (0, 0),
            resets: 0,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.rig.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.rig.camera
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.rig.clock.elapsed_secs()
    }

    pub fn sensor(&self) -> &RotationSensor {
        self.rig.sensor()
    }

    pub fn resolution_scale(&self) -> ResolutionScale {
        self.scale
    }

    /// Size of the off-screen target.
    pub fn render_size(&self) -> (u32, u32) {
        self.target.size()
    }

    /// Number of collision resets so far.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Changes the render scale; the target is rebuilt now if a surface
    /// exists.
    pub fn set_resolution_scale(
        &mut self,
        gpu: &mut dyn GpuBackend,
        scale: ResolutionScale,
    ) -> Result<(), SceneError> {
        self.scale = scale;
        if self.lifecycle.has_surface() {
            self.rebuild_target(gpu)?;
        }
        Ok(())
    }

    fn rebuild_target(&mut self, gpu: &mut dyn GpuBackend) -> Result<(), SceneError> {
        let (w, h) = self.scale.apply(self.surface.0, self.surface.1);
        self.target.recreate(gpu, w, h)?;
        Ok(())
    }

    fn release(&mut self, gpu: &mut dyn GpuBackend) {
        self.target.destroy(gpu);
        if let Some(program) = self.program.take() {
            gpu.delete_program(program);
        }
    }

    fn uniforms(&self, elapsed: f32) -> RaymarchUniforms {
        let cam = &self.rig.camera;
        let p = &self.config.prison;
        let mut u = RaymarchUniforms::camera(
            &cam.rotation,
            cam.position,
            elapsed,
            self.target.size(),
            self.rig.fov_y,
            self.config.max_distance,
            self.config.max_steps,
        );
        u.shape_a = [p.cell_size, p.cross_half_width, p.iterations as f32, p.hit_threshold];
        u
    }
}

impl Scene for MengerPrisonScene {
    fn name(&self) -> &'static str {
        "menger-prison"
    }

    fn on_attach(&mut self) {
        self.rig.attach();
    }

    fn on_detach(&mut self, gpu: &mut dyn GpuBackend) {
        self.rig.detach();
        self.release(gpu);
        self.lifecycle.tear_down();
    }

    fn on_surface_created(&mut self, gpu: &mut dyn GpuBackend) -> Result<(), SceneError> {
        self.lifecycle.surface_created()?;
        // A re-created surface invalidates everything built for the old one.
        self.release(gpu);

        let program = gpu.create_program(&ProgramDesc {
            label: "menger prison",
            wgsl: SHADER,
            uniform_size: size_of::<RaymarchUniforms>() as u64,
            sampled_texture: false,
            vertex_input: VertexInput::FullscreenTriangle,
            output: ProgramOutput::Offscreen,
            depth_test: false,
            cull_back_faces: false,
        })?;
        self.program = Some(program);

        self.surface = gpu.surface_size();
        self.rebuild_target(gpu)
    }

    fn on_surface_changed(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
    ) -> Result<(), SceneError> {
        self.lifecycle.surface_changed()?;
        self.surface = (width, height);
        self.rebuild_target(gpu)
    }

    fn on_draw_frame(&mut self, gpu: &mut dyn GpuBackend, now: Instant) -> Result<(), SceneError> {
        self.lifecycle.begin_frame()?;

        self.rig.tick(now);

        let distance = self.config.prison.distance(self.rig.camera.position);
        if distance <= 0.0 {
            log::info!(
                "menger prison: camera entered the lattice at {:?} (d = {distance}); resetting",
                self.rig.camera.position
            );
            self.reset();
        }

        let (Some(program), Some(target), Some(fb)) =
            (self.program, self.target.target(), self.target.handle())
        else {
            return Err(SceneError::NotReady(self.lifecycle.state()));
        };

        let uniforms = self.uniforms(self.rig.clock.elapsed_secs());
        gpu.draw(&DrawCall {
            program,
            target,
            uniforms: bytemuck::bytes_of(&uniforms),
            texture: None,
            mesh: None,
            clear: Some([0.0, 0.0, 0.0, 1.0]),
        })?;
        gpu.blit(fb, DrawTarget::Surface)?;
        Ok(())
    }

    fn on_touch_event(&mut self, event: &TouchEvent) {
        if self.rig.on_touch_event(event).is_some() {
            let cam = &mut self.rig.camera;
            cam.paused = !cam.paused;
            log::debug!("menger prison: flight {}", if cam.paused { "paused" } else { "resumed" });
        }
    }

    fn on_orientation_change(&mut self, orientation: ScreenOrientation) {
        self.rig.set_orientation(orientation);
    }

    fn reset(&mut self) {
        self.rig.reset();
        self.resets += 1;
    }

    fn on_key(&mut self, key: Key) {
        if key == Key::Space {
            self.rig.camera.paused = !self.rig.camera.paused;
        }
    }
}

impl Drop for MengerPrisonScene {
    fn drop(&mut self) {
        if self.program.is_some() {
            log::warn!("menger prison dropped without on_detach; GPU resources leaked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mirage_engine::render::{HeadlessBackend, RecordedOp};

    use super::*;

    fn scene() -> MengerPrisonScene {
        MengerPrisonScene::new(
            PrisonConfig::default(),
            ResolutionScale::Quarter,
            RotationFeed::new(),
        )
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn draw_before_surface_is_rejected() {
        let mut gpu = HeadlessBackend::new(800, 600);
        let mut s = scene();
        assert!(matches!(
            s.on_draw_frame(&mut gpu, Instant::now()),
            Err(SceneError::NotReady(_))
        ));
    }

    #[test]
    fn frame_renders_offscreen_then_blits() {
        let mut gpu = HeadlessBackend::new(800, 600);
        let mut s = scene();
        s.on_attach();
        s.on_surface_created(&mut gpu).unwrap();
        s.on_surface_changed(&mut gpu, 800, 600).unwrap();
        assert_eq!(s.render_size(), (200, 150));

        s.on_draw_frame(&mut gpu, Instant::now()).unwrap();
        assert_eq!(gpu.draws().len(), 1);
        assert_eq!(gpu.draws()[0].label, "menger prison");
        assert!(matches!(
            gpu.ops().last(),
            Some(RecordedOp::Blit { dst: DrawTarget::Surface, .. })
        ));

        s.on_detach(&mut gpu);
        assert!(gpu.counts().is_balanced());
        assert!(!s.sensor().feed().is_registered());
    }

    #[test]
    fn shader_failure_is_fatal() {
        let mut gpu = HeadlessBackend::new(800, 600);
        gpu.fail_next_program("syntax error");
        let mut s = scene();
        assert!(matches!(
            s.on_surface_created(&mut gpu),
            Err(SceneError::Gpu(_))
        ));
        s.on_detach(&mut gpu);
    }

    // ── options ───────────────────────────────────────────────────────────

    #[test]
    fn scale_change_rebuilds_target() {
        let mut gpu = HeadlessBackend::new(1024, 512);
        let mut s = scene();
        s.on_surface_created(&mut gpu).unwrap();
        assert_eq!(s.render_size(), (256, 128));
        s.set_resolution_scale(&mut gpu, ResolutionScale::Full).unwrap();
        assert_eq!(s.render_size(), (1024, 512));
        assert_eq!(gpu.live_framebuffers(), 1);
        s.on_detach(&mut gpu);
    }

    // ── flight ────────────────────────────────────────────────────────────

    #[test]
    fn tap_pauses_flight() {
        use mirage_engine::input::{TouchAction, TouchPointer};
        use mirage_engine::math::Vec2;

        let mut s = scene();
        let p = vec![TouchPointer { id: 1, position: Vec2::new(5.0, 5.0) }];
        s.on_touch_event(&TouchEvent::new(TouchAction::Down, 1, p.clone(), Duration::ZERO));
        s.on_touch_event(&TouchEvent::new(
            TouchAction::Up,
            1,
            p,
            Duration::from_millis(50),
        ));
        assert!(s.camera().paused);
    }
}
