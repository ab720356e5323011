use std::time::Instant;

use mirage_engine::core::{Lifecycle, Scene, SceneError};
use mirage_engine::gesture::{
    FlingIntegrator, PanFlingDetector, PanGesture, PinchDetector, RotationGestureDetector,
};
use mirage_engine::input::{Key, TouchEvent};
use mirage_engine::math::{Mat3, Mat4, Vec2, Vec3};
use mirage_engine::render::{
    DrawCall, DrawTarget, GpuBackend, MeshHandle, MeshVertex, PingPong, ProgramDesc,
    ProgramHandle, ProgramOutput, VertexInput,
};
use mirage_engine::sensor::ScreenOrientation;
use mirage_engine::time::SceneClock;

use crate::config::CubeConfig;
use crate::uniforms::CubeUniforms;

const SHADER: &str = include_str!("shaders/cube.wgsl");

/// Face tag of the mirrored face (the one facing the camera at rest).
pub const MIRROR_FACE: f32 = 0.0;

/// The "infinite mirror" cube.
///
/// Two off-screen targets trade roles: each frame the cube is drawn into the
/// write target with its front face sampling the read target, which holds
/// the previous completed frame. The write target is then shown on the
/// surface and the roles swap (or, staggered, swap only every
/// `stagger_interval` seconds).
pub struct InfiniteCubeScene {
    config: CubeConfig,
    lifecycle: Lifecycle,
    clock: SceneClock,

    yaw: f32,
    pitch: f32,
    distance: f32,
    pan: PanFlingDetector,
    fling: FlingIntegrator,
    pinch: PinchDetector,
    roll: RotationGestureDetector,

    program: Option<ProgramHandle>,
    mesh: Option<MeshHandle>,
    targets: PingPong,
    surface: (u32, u32),
    frames: u64,
}

impl InfiniteCubeScene {
    pub fn new(config: CubeConfig) -> Self {
        let g = &config.gestures;
        Self {
            lifecycle: Lifecycle::new(),
            clock: SceneClock::new(),
            yaw: 0.0,
            pitch: 0.0,
            distance: config.distance,
            pan: PanFlingDetector::new(g),
            fling: FlingIntegrator::new(g.fling_drag, g.fling_epsilon),
            pinch: PinchDetector::new(g),
            roll: RotationGestureDetector::new(),
            program: None,
            mesh: None,
            targets: PingPong::default(),
            surface: (0, 0),
            frames: 0,
            config,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn targets(&self) -> &PingPong {
        &self.targets
    }

    /// `(yaw, pitch)` in radians.
    pub fn angles(&self) -> (f32, f32) {
        (self.yaw, self.pitch)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn roll(&self) -> f32 {
        self.roll.total_rotation()
    }

    pub fn is_flinging(&self) -> bool {
        self.fling.is_active()
    }

    pub fn set_staggered(&mut self, staggered: bool) {
        let interval = staggered.then_some(self.config.stagger_interval.unwrap_or(0.5));
        self.config.stagger_interval = interval;
        self.targets.set_stagger(interval);
    }

    /// Object rotation: yaw about Y, then pitch about X, then roll about the
    /// view axis.
    pub fn rotation(&self) -> Mat3 {
        Mat3::rotation(Vec3::Y, self.yaw)
            * Mat3::rotation(Vec3::X, self.pitch)
            * Mat3::rotation(Vec3::Z, self.roll.total_rotation())
    }

    pub fn mvp(&self) -> Mat4 {
        let (w, h) = self.targets.size();
        let aspect = if h == 0 { 1.0 } else { w as f32 / h as f32 };
        let proj = Mat4::perspective(self.config.fov_y, aspect, self.config.near, self.config.far);
        let view = Mat4::translation(Vec3::new(0.0, 0.0, self.distance));
        Mat4::DEPTH_ZERO_TO_ONE * proj * view * Mat4::from_mat3(self.rotation())
    }

    fn rotate_by_pixels(&mut self, delta: Vec2) {
        let s = self.config.gestures.pan_sensitivity;
        self.yaw -= delta.x * s;
        self.pitch -= delta.y * s;
    }

    fn release(&mut self, gpu: &mut dyn GpuBackend) {
        self.targets.destroy(gpu);
        if let Some(program) = self.program.take() {
            gpu.delete_program(program);
        }
        if let Some(mesh) = self.mesh.take() {
            gpu.delete_mesh(mesh);
        }
    }
}

impl Scene for InfiniteCubeScene {
    fn name(&self) -> &'static str {
        "infinite-cube"
    }

    fn on_attach(&mut self) {}

    fn on_detach(&mut self, gpu: &mut dyn GpuBackend) {
        self.release(gpu);
        self.lifecycle.tear_down();
    }

    fn on_surface_created(&mut self, gpu: &mut dyn GpuBackend) -> Result<(), SceneError> {
        self.lifecycle.surface_created()?;
        self.release(gpu);

        self.program = Some(gpu.create_program(&ProgramDesc {
            label: "infinite cube",
            wgsl: SHADER,
            uniform_size: size_of::<CubeUniforms>() as u64,
            sampled_texture: true,
            vertex_input: VertexInput::Mesh,
            output: ProgramOutput::Offscreen,
            depth_test: true,
            cull_back_faces: false,
        })?);

        let (vertices, indices) = cube_mesh();
        self.mesh = Some(gpu.create_mesh(&vertices, &indices)?);

        self.surface = gpu.surface_size();
        self.targets = PingPong::create(gpu, self.surface.0, self.surface.1, self.config.clear_color)?
            .with_stagger(self.config.stagger_interval);
        self.frames = 0;
        Ok(())
    }

    fn on_surface_changed(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
    ) -> Result<(), SceneError> {
        self.lifecycle.surface_changed()?;
        self.surface = (width, height);
        self.targets.resize(gpu, width, height, self.config.clear_color)?;
        self.frames = 0;
        Ok(())
    }

    fn on_draw_frame(&mut self, gpu: &mut dyn GpuBackend, now: Instant) -> Result<(), SceneError> {
        self.lifecycle.begin_frame()?;
        let ft = self.clock.tick(now);

        if self.fling.is_active() {
            let v = self.fling.step();
            self.rotate_by_pixels(v * ft.dt);
        }

        let (Some(program), Some(mesh)) = (self.program, self.mesh) else {
            return Err(SceneError::NotReady(self.lifecycle.state()));
        };
        let (Some(write), Some(write_fb), Some(read_color)) = (
            self.targets.write().target(),
            self.targets.write().handle(),
            self.targets.read().color(),
        ) else {
            return Err(SceneError::NotReady(self.lifecycle.state()));
        };

        let uniforms = CubeUniforms::new(&self.mvp(), ft.elapsed, self.frames == 0);
        gpu.draw(&DrawCall {
            program,
            target: write,
            uniforms: bytemuck::bytes_of(&uniforms),
            texture: Some(read_color),
            mesh: Some(mesh),
            clear: Some(self.config.clear_color),
        })?;
        gpu.blit(write_fb, DrawTarget::Surface)?;

        self.targets.advance(ft.dt);
        self.frames += 1;
        Ok(())
    }

    fn on_touch_event(&mut self, event: &TouchEvent) {
        match self.pan.on_touch_event(event) {
            Some(PanGesture::Pan(delta)) => {
                self.fling.stop();
                self.rotate_by_pixels(delta);
            }
            Some(PanGesture::Fling(velocity)) => self.fling.launch(velocity),
            Some(PanGesture::Tap(_)) => self.fling.stop(),
            None => {}
        }

        if let Some(ratio) = self.pinch.on_touch_event(event) {
            self.distance = (self.distance / ratio)
                .clamp(self.config.min_distance, self.config.max_distance);
        }
        self.roll.on_touch_event(event);
    }

    fn on_orientation_change(&mut self, _orientation: ScreenOrientation) {}

    fn reset(&mut self) {
        self.clock.reset();
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.distance = self.config.distance;
        self.fling.stop();
        self.roll.reset();
    }

    fn on_key(&mut self, key: Key) {
        if key == Key::Space {
            let staggered = !self.targets.is_staggered();
            self.set_staggered(staggered);
            log::info!("infinite cube: staggered mirror {}", if staggered { "on" } else { "off" });
        }
    }
}

/// Unit cube centered at the origin; 4 vertices per face so every face gets
/// its own UVs. Face 0 is the `-Z` face, the one facing the camera at rest.
pub fn cube_mesh() -> (Vec<MeshVertex>, Vec<u16>) {
    // (center, u axis, v axis); v runs top to bottom as seen from outside.
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::new(0.0, 0.0, -0.5), Vec3::X, -Vec3::Y),
        (Vec3::new(0.0, 0.0, 0.5), -Vec3::X, -Vec3::Y),
        (Vec3::new(0.5, 0.0, 0.0), Vec3::Z, -Vec3::Y),
        (Vec3::new(-0.5, 0.0, 0.0), -Vec3::Z, -Vec3::Y),
        (Vec3::new(0.0, 0.5, 0.0), Vec3::X, Vec3::Z),
        (Vec3::new(0.0, -0.5, 0.0), Vec3::X, -Vec3::Z),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (center, u, v)) in faces.into_iter().enumerate() {
        let base = vertices.len() as u16;
        for (i, j) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let p = center + u * (i - 0.5) + v * (j - 0.5);
            vertices.push(MeshVertex {
                position: p.to_array(),
                uv: [i, j],
                tag: face as f32,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}
