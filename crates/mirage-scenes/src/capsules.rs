use std::time::Instant;

use mirage_engine::core::{Lifecycle, Scene, SceneError};
use mirage_engine::input::{Key, TouchEvent};
use mirage_engine::math::Vec3;
use mirage_engine::render::{
    DrawCall, DrawTarget, GpuBackend, ProgramDesc, ProgramHandle, ProgramOutput, VertexInput,
};
use mirage_engine::sdf::CapsuleField;
use mirage_engine::sensor::{RotationFeed, RotationSensor, ScreenOrientation};

use crate::FlyCamera;
use crate::config::CapsuleConfig;
use crate::flight::FlightRig;
use crate::uniforms::RaymarchUniforms;

const SHADER: &str = concat!(
    include_str!("shaders/raymarch_common.wgsl"),
    include_str!("shaders/capsules.wgsl"),
);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProjectileState {
    Flying,
    /// Hit a capsule; stays there as a light.
    Stuck,
}

/// Light fired from the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vec3,
    pub direction: Vec3,
    pub traveled: f32,
    pub state: ProjectileState,
}

impl Projectile {
    pub fn launch(origin: Vec3, direction: Vec3) -> Self {
        Self {
            position: origin,
            direction: direction.normalize(),
            traveled: 0.0,
            state: ProjectileState::Flying,
        }
    }

    /// Moves a flying projectile and sticks it on contact. Returns false once
    /// it has flown `range` without hitting anything.
    pub fn step(&mut self, field: &CapsuleField, speed: f32, dt: f32, range: f32) -> bool {
        if self.state == ProjectileState::Stuck {
            return true;
        }
        let step = speed * dt.max(0.0);
        self.position += self.direction * step;
        self.traveled += step;
        if field.distance(self.position) <= 0.0 {
            self.state = ProjectileState::Stuck;
            return true;
        }
        self.traveled < range
    }
}

/// Flight through an infinite field of capsules. A tap fires a light.
pub struct CapsuleScene {
    config: CapsuleConfig,
    rig: FlightRig,
    lifecycle: Lifecycle,
    program: Option<ProgramHandle>,
    surface: (u32, u32),
    projectile: Option<Projectile>,
    resets: u32,
}

impl CapsuleScene {
    pub fn new(config: CapsuleConfig, feed: RotationFeed) -> Self {
        let rig = FlightRig::new(&config.flight, config.home(), feed);
        Self {
            config,
            rig,
            lifecycle: Lifecycle::new(),
            program: None,
            surface: (0, 0),
            projectile: None,
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

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Fires a new projectile from the camera, replacing any previous one.
    pub fn fire(&mut self) {
        let cam = &self.rig.camera;
        self.projectile = Some(Projectile::launch(cam.position, cam.forward()));
    }

    fn step_projectile(&mut self, dt: f32) {
        let Some(p) = self.projectile.as_mut() else {
            return;
        };
        let alive = p.step(
            &self.config.field,
            self.config.projectile_speed,
            dt,
            self.config.projectile_range,
        );
        if !alive {
            log::debug!("capsules: projectile expired after {:.1} units", p.traveled);
            self.projectile = None;
        }
    }

    fn uniforms(&self) -> RaymarchUniforms {
        let cam = &self.rig.camera;
        let field = &self.config.field;
        let mut u = RaymarchUniforms::camera(
            &cam.rotation,
            cam.position,
            self.rig.clock.elapsed_secs(),
            self.surface,
            self.rig.fov_y,
            self.config.max_distance,
            self.config.max_steps,
        );
        u.shape_a = field.capsule.a.extend(field.capsule.radius);
        u.shape_b = field.capsule.b.extend(field.cell_size);
        u.shape_c = match &self.projectile {
            None => [0.0; 4],
            Some(p) => p.position.extend(match p.state {
                ProjectileState::Flying => 1.0,
                ProjectileState::Stuck => 2.0,
            }),
        };
        u
    }

    fn release(&mut self, gpu: &mut dyn GpuBackend) {
        if let Some(program) = self.program.take() {
            gpu.delete_program(program);
        }
    }
}

impl Scene for CapsuleScene {
    fn name(&self) -> &'static str {
        "capsules"
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
        self.release(gpu);
        let program = gpu.create_program(&ProgramDesc {
            label: "capsules",
            wgsl: SHADER,
            uniform_size: size_of::<RaymarchUniforms>() as u64,
            sampled_texture: false,
            vertex_input: VertexInput::FullscreenTriangle,
            output: ProgramOutput::Surface,
            depth_test: false,
            cull_back_faces: false,
        })?;
        self.program = Some(program);
        self.surface = gpu.surface_size();
        Ok(())
    }

    fn on_surface_changed(
        &mut self,
        _gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
    ) -> Result<(), SceneError> {
        self.lifecycle.surface_changed()?;
        self.surface = (width, height);
        Ok(())
    }

    fn on_draw_frame(&mut self, gpu: &mut dyn GpuBackend, now: Instant) -> Result<(), SceneError> {
        self.lifecycle.begin_frame()?;

        let ft = self.rig.tick(now);
        self.step_projectile(ft.dt);

        let distance = self.config.field.distance(self.rig.camera.position);
        if distance <= 0.0 {
            log::info!(
                "capsules: camera hit a capsule at {:?}; resetting",
                self.rig.camera.position
            );
            self.reset();
        }

        let Some(program) = self.program else {
            return Err(SceneError::NotReady(self.lifecycle.state()));
        };
        let uniforms = self.uniforms();
        gpu.draw(&DrawCall {
            program,
            target: DrawTarget::Surface,
            uniforms: bytemuck::bytes_of(&uniforms),
            texture: None,
            mesh: None,
            clear: Some([0.0, 0.0, 0.0, 1.0]),
        })?;
        Ok(())
    }

    fn on_touch_event(&mut self, event: &TouchEvent) {
        if self.rig.on_touch_event(event).is_some() {
            self.fire();
        }
    }

    fn on_orientation_change(&mut self, orientation: ScreenOrientation) {
        self.rig.set_orientation(orientation);
    }

    fn reset(&mut self) {
        self.rig.reset();
        self.projectile = None;
        self.resets += 1;
    }

    fn on_key(&mut self, key: Key) {
        match key {
            Key::Enter => self.fire(),
            Key::Space => self.rig.camera.paused = !self.rig.camera.paused,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mirage_engine::render::HeadlessBackend;

    use super::*;

    fn field() -> CapsuleField {
        CapsuleConfig::default().field
    }

    // ── projectile ────────────────────────────────────────────────────────

    #[test]
    fn projectile_sticks_on_contact() {
        // Flies along +X at capsule height, straight into the next column.
        let mut p = Projectile::launch(Vec3::new(1.5, 0.0, 0.0), Vec3::X);
        let mut steps = 0;
        while p.state == ProjectileState::Flying {
            assert!(p.step(&field(), 1.0, 0.05, 100.0));
            steps += 1;
            assert!(steps < 100);
        }
        let stuck_at = p.position;
        assert!(field().distance(stuck_at) <= 0.0);
        p.step(&field(), 1.0, 0.05, 100.0);
        assert_eq!(p.position, stuck_at);
    }

    #[test]
    fn projectile_expires_out_of_range() {
        // Between the columns, parallel to them: never hits.
        let mut p = Projectile::launch(Vec3::new(1.5, 1.5, 0.0), Vec3::Z);
        let mut alive = true;
        for _ in 0..20 {
            alive = p.step(&field(), 1.0, 1.0, 10.0);
            if !alive {
                break;
            }
        }
        assert!(!alive);
        assert_eq!(p.state, ProjectileState::Flying);
    }

    // ── scene ─────────────────────────────────────────────────────────────

    #[test]
    fn collision_clears_projectile() {
        let mut gpu = HeadlessBackend::new(320, 240);
        let mut s = CapsuleScene::new(CapsuleConfig::default(), RotationFeed::new());
        s.on_surface_created(&mut gpu).unwrap();

        let t0 = Instant::now();
        s.on_draw_frame(&mut gpu, t0).unwrap();
        s.fire();
        assert!(s.projectile().is_some());

        // Put the camera just short of a capsule surface, facing it.
        s.camera_mut().position = Vec3::new(0.0, 0.0, -0.4);
        s.on_draw_frame(&mut gpu, t0 + Duration::from_millis(200)).unwrap();

        assert_eq!(s.resets(), 1);
        assert!(s.projectile().is_none());
        assert_eq!(s.camera().position, CapsuleConfig::default().home());
        assert_eq!(s.elapsed_secs(), 0.0);
        s.on_detach(&mut gpu);
        assert!(gpu.counts().is_balanced());
    }

    #[test]
    fn enter_key_fires() {
        let mut s = CapsuleScene::new(CapsuleConfig::default(), RotationFeed::new());
        s.on_key(Key::Enter);
        let p = s.projectile().unwrap();
        assert_eq!(p.position, CapsuleConfig::default().home());
        assert_eq!(p.direction, Vec3::Z);
    }
}
