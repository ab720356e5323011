use std::time::Instant;

use mirage_engine::core::{Lifecycle, Scene, SceneError};
use mirage_engine::gesture::{
    FlingIntegrator, PanFlingDetector, PanGesture, PinchDetector, RotationGestureDetector,
};
use mirage_engine::input::{Key, TouchEvent};
use mirage_engine::math::{Mat2, Vec2};
use mirage_engine::render::{
    DrawCall, DrawTarget, GpuBackend, ProgramDesc, ProgramHandle, ProgramOutput, VertexInput,
};
use mirage_engine::sensor::ScreenOrientation;
use mirage_engine::time::SceneClock;

use crate::config::MandelbrotConfig;
use crate::options::PaletteIndex;
use crate::uniforms::MandelbrotUniforms;

const SHADER: &str = include_str!("shaders/mandelbrot.wgsl");

/// Escape-time Mandelbrot explorer.
///
/// One pixel of pan moves the center by `2 / (height * zoom)`: the visible
/// plane is two units tall at zoom 1.
pub struct MandelbrotScene {
    config: MandelbrotConfig,
    lifecycle: Lifecycle,
    clock: SceneClock,

    center: Vec2,
    zoom: f32,
    palette: PaletteIndex,

    pan: PanFlingDetector,
    fling: FlingIntegrator,
    pinch: PinchDetector,
    rotation: RotationGestureDetector,

    program: Option<ProgramHandle>,
    surface: (u32, u32),
}

impl MandelbrotScene {
    pub fn new(config: MandelbrotConfig, palette: PaletteIndex) -> Self {
        let g = &config.gestures;
        Self {
            lifecycle: Lifecycle::new(),
            clock: SceneClock::new(),
            center: Vec2::new(config.center[0], config.center[1]),
            zoom: 1.0,
            palette,
            pan: PanFlingDetector::new(g),
            fling: FlingIntegrator::new(g.fling_drag, g.fling_epsilon),
            pinch: PinchDetector::new(g),
            rotation: RotationGestureDetector::new(),
            program: None,
            surface: (0, 0),
            config,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn angle(&self) -> f32 {
        self.rotation.total_rotation()
    }

    pub fn palette(&self) -> PaletteIndex {
        self.palette
    }

    /// Escape iterations for the current zoom: grows by
    /// `iterations_per_octave` per doubling, clamped to the configured max.
    pub fn iterations(&self) -> u32 {
        let cfg = &self.config;
        let octaves = self.zoom.max(1.0).log2();
        let n = cfg.base_iterations as f32 + cfg.iterations_per_octave * octaves;
        (n as u32).clamp(cfg.base_iterations, cfg.max_iterations.max(cfg.base_iterations))
    }

    /// Moves the view by a screen-space pixel delta. Dragging right moves
    /// the picture right, so the center moves left.
    fn pan_by_pixels(&mut self, delta: Vec2) {
        let height = self.surface.1.max(1) as f32;
        let units_per_pixel = 2.0 / (height * self.zoom);
        // Screen y grows downward; the complex plane's imaginary axis up.
        let plane = Vec2::new(-delta.x, delta.y) * units_per_pixel;
        let rotated = Mat2::rotation(self.angle()) * plane;
        if rotated.is_finite() {
            self.center += rotated;
        }
    }

    fn zoom_by(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        }
    }

    fn uniforms(&self, elapsed: f32) -> MandelbrotUniforms {
        MandelbrotUniforms {
            view: [self.center.x, self.center.y, self.zoom, self.angle()],
            screen: [
                self.surface.0 as f32,
                self.surface.1 as f32,
                self.iterations() as f32,
                self.palette.get() as f32,
            ],
            time: [elapsed, 0.0, 0.0, 0.0],
        }
    }

    fn release(&mut self, gpu: &mut dyn GpuBackend) {
        if let Some(program) = self.program.take() {
            gpu.delete_program(program);
        }
    }
}

impl Scene for MandelbrotScene {
    fn name(&self) -> &'static str {
        "mandelbrot"
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
            label: "mandelbrot",
            wgsl: SHADER,
            uniform_size: size_of::<MandelbrotUniforms>() as u64,
            sampled_texture: false,
            vertex_input: VertexInput::FullscreenTriangle,
            output: ProgramOutput::Surface,
            depth_test: false,
            cull_back_faces: false,
        })?);
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
        let ft = self.clock.tick(now);

        if self.fling.is_active() {
            let v = self.fling.step();
            self.pan_by_pixels(v * ft.dt);
        }

        let Some(program) = self.program else {
            return Err(SceneError::NotReady(self.lifecycle.state()));
        };
        let uniforms = self.uniforms(ft.elapsed);
        gpu.draw(&DrawCall {
            program,
            target: DrawTarget::Surface,
            uniforms: bytemuck::bytes_of(&uniforms),
            texture: None,
            mesh: None,
            clear: None,
        })?;
        Ok(())
    }

    fn on_touch_event(&mut self, event: &TouchEvent) {
        match self.pan.on_touch_event(event) {
            Some(PanGesture::Pan(delta)) => {
                self.fling.stop();
                self.pan_by_pixels(delta);
            }
            Some(PanGesture::Fling(velocity)) => self.fling.launch(velocity),
            Some(PanGesture::Tap(_)) => {
                self.fling.stop();
                self.palette = self.palette.cycle(self.config.palette_count);
            }
            None => {}
        }

        if let Some(factor) = self.pinch.on_touch_event(event) {
            self.zoom_by(factor);
        }
        self.rotation.on_touch_event(event);
    }

    fn on_orientation_change(&mut self, _orientation: ScreenOrientation) {}

    fn reset(&mut self) {
        self.clock.reset();
        self.center = Vec2::new(self.config.center[0], self.config.center[1]);
        self.zoom = 1.0;
        self.fling.stop();
        self.rotation.reset();
    }

    fn on_key(&mut self, key: Key) {
        let palette = match key {
            Key::Digit0 => 0,
            Key::Digit1 => 1,
            Key::Digit2 => 2,
            Key::Digit3 => 3,
            _ => return,
        };
        if let Some(p) = PaletteIndex::new(palette, self.config.palette_count) {
            self.palette = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mirage_engine::input::{TouchAction, TouchPointer};
    use mirage_engine::render::HeadlessBackend;

    use super::*;

    fn touch(action: TouchAction, id: u64, pts: &[(u64, f32, f32)], ms: u64) -> TouchEvent {
        let pointers = pts
            .iter()
            .map(|&(id, x, y)| TouchPointer { id, position: Vec2::new(x, y) })
            .collect();
        TouchEvent::new(action, id, pointers, Duration::from_millis(ms))
    }

    fn ready(gpu: &mut HeadlessBackend) -> MandelbrotScene {
        let mut s = MandelbrotScene::new(MandelbrotConfig::default(), PaletteIndex::default());
        s.on_surface_created(gpu).unwrap();
        s
    }

    #[test]
    fn iterations_grow_with_zoom() {
        let mut s = MandelbrotScene::new(MandelbrotConfig::default(), PaletteIndex::default());
        assert_eq!(s.iterations(), 64);
        s.zoom = 4.0;
        assert_eq!(s.iterations(), 64 + 48);
        s.zoom = 1.0e5;
        assert!(s.iterations() <= 1024);
        s.zoom = 0.5;
        assert_eq!(s.iterations(), 64);
    }

    #[test]
    fn pan_drag_moves_center_opposite() {
        let mut gpu = HeadlessBackend::new(400, 200);
        let mut s = ready(&mut gpu);
        let start = s.center();
        s.on_touch_event(&touch(TouchAction::Down, 1, &[(1, 0.0, 0.0)], 0));
        s.on_touch_event(&touch(TouchAction::Move, 1, &[(1, 1.0, 0.0)], 300));
        s.on_touch_event(&touch(TouchAction::Move, 1, &[(1, 101.0, 0.0)], 310));
        // 100 px on a 200 px tall view at zoom 1 is one unit.
        assert!((s.center().x - (start.x - 1.0)).abs() < 1.0e-5);
        assert!((s.center().y - start.y).abs() < 1.0e-6);
        s.on_detach(&mut gpu);
    }

    #[test]
    fn pinch_zooms_within_limits() {
        let mut s = MandelbrotScene::new(MandelbrotConfig::default(), PaletteIndex::default());
        s.on_touch_event(&touch(TouchAction::Down, 1, &[(1, 100.0, 100.0)], 0));
        s.on_touch_event(&touch(
            TouchAction::PointerDown,
            2,
            &[(1, 100.0, 100.0), (2, 200.0, 100.0)],
            5,
        ));
        s.on_touch_event(&touch(
            TouchAction::Move,
            1,
            &[(1, 50.0, 100.0), (2, 250.0, 100.0)],
            10,
        ));
        assert!((s.zoom() - 2.0).abs() < 1.0e-5);
        s.on_touch_event(&touch(
            TouchAction::Move,
            1,
            &[(1, 149.0, 100.0), (2, 151.0, 100.0)],
            15,
        ));
        assert_eq!(s.zoom(), MandelbrotConfig::default().min_zoom);
    }

    #[test]
    fn tap_cycles_palette_and_keys_select() {
        let mut s = MandelbrotScene::new(MandelbrotConfig::default(), PaletteIndex::default());
        s.on_touch_event(&touch(TouchAction::Down, 1, &[(1, 10.0, 10.0)], 0));
        s.on_touch_event(&touch(TouchAction::Up, 1, &[(1, 10.0, 10.0)], 40));
        assert_eq!(s.palette().get(), 1);
        s.on_key(Key::Digit3);
        assert_eq!(s.palette().get(), 3);
    }

    #[test]
    fn draws_full_screen_to_surface() {
        let mut gpu = HeadlessBackend::new(400, 200);
        let mut s = ready(&mut gpu);
        s.on_draw_frame(&mut gpu, Instant::now()).unwrap();
        let draw = &gpu.draws()[0];
        assert_eq!(draw.target, DrawTarget::Surface);
        let u: MandelbrotUniforms = bytemuck::pod_read_unaligned(&draw.uniforms);
        assert_eq!(u.screen[0..3], [400.0, 200.0, 64.0]);
        s.on_detach(&mut gpu);
        assert!(gpu.counts().is_balanced());
    }
}
