use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::Scene;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState, Key};
use crate::render::{GpuBackend, WgpuBackend};
use crate::sensor::ScreenOrientation;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "mirage".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Drives one [`Scene`] in a desktop window.
///
/// winit callbacks map onto the renderer contract: `resumed` creates the
/// surface, `Resized` changes it, `RedrawRequested` draws a frame. Escape
/// exits; `R` resets the scene.
pub struct Runtime;

impl Runtime {
    pub fn run<S>(config: RuntimeConfig, gpu_init: GpuInit, scene: S) -> Result<()>
    where
        S: Scene + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = HostState::new(config, gpu_init, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    backend: WgpuBackend<'this>,
}

struct HostState<S: Scene> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    scene: S,

    window: Option<WindowEntry>,
    input_state: InputState,
    input_frame: InputFrame,

    attached: bool,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<S: Scene> HostState<S> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, scene: S) -> Self {
        Self {
            config,
            gpu_init,
            scene,
            window: None,
            input_state: InputState::new(Instant::now()),
            input_frame: InputFrame::default(),
            attached: false,
            exit_requested: false,
            fatal: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            backend_builder: |w| build_backend(w, gpu_init),
        }
        .try_build()?;

        let (logical, physical) = entry.with_window(|w| {
            let size = w.inner_size();
            (size.to_logical::<f32>(w.scale_factor()), size)
        });
        self.input_state.set_viewport(logical.width, logical.height);

        if !self.attached {
            self.scene.on_attach();
            self.attached = true;
        }

        let scene = &mut self.scene;
        let mut entry = entry;
        // The backend may clamp the surface below the window size.
        let (width, height) = entry.with_backend_mut(|backend| -> Result<(u32, u32)> {
            scene
                .on_surface_created(&mut *backend)
                .context("scene GPU setup failed")?;
            let (width, height) = backend.surface_size();
            scene
                .on_surface_changed(&mut *backend, width, height)
                .context("scene resize failed")?;
            Ok((width, height))
        })?;

        self.scene.on_orientation_change(orientation_of(physical.width, physical.height));
        log::info!("scene `{}` ready at {width}x{height}", self.scene.name());

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.window.take() {
            let scene = &mut self.scene;
            entry.with_backend_mut(|backend| scene.on_detach(backend));
        }
        self.attached = false;
        self.exit_requested = true;
        event_loop.exit();
    }

    fn resize(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        let (logical, physical) = entry.with_window(|w| {
            let size = w.inner_size();
            (size.to_logical::<f32>(w.scale_factor()), size)
        });
        if physical.width == 0 || physical.height == 0 {
            // Minimized; keep the old resources until a real size arrives.
            return;
        }
        self.input_state.set_viewport(logical.width, logical.height);

        let scene = &mut self.scene;
        let result = entry.with_backend_mut(|backend| {
            backend.resize(physical);
            let (width, height) = backend.surface_size();
            scene.on_surface_changed(&mut *backend, width, height)
        });
        if let Err(e) = result {
            self.fail(event_loop, anyhow::Error::new(e).context("scene resize failed"));
            return;
        }
        self.scene
            .on_orientation_change(orientation_of(physical.width, physical.height));
    }

    /// Hands buffered input to the scene. Returns false on exit request.
    fn dispatch_input(&mut self) -> bool {
        for ev in self.input_frame.drain_touches() {
            self.scene.on_touch_event(&ev);
        }

        let mut keep_running = true;
        for &key in &self.input_frame.keys_pressed {
            match key {
                Key::Escape => keep_running = false,
                Key::R => {
                    log::info!("scene `{}` reset requested", self.scene.name());
                    self.scene.reset();
                }
                other => self.scene.on_key(other),
            }
        }
        self.input_frame.clear();
        keep_running
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.dispatch_input() {
            self.shutdown(event_loop);
            return;
        }

        let Some(entry) = self.window.as_mut() else {
            return;
        };
        let scene = &mut self.scene;

        let result = entry.with_mut(|fields| {
            match fields.backend.begin_frame() {
                Ok(()) => {}
                Err(SurfaceErrorAction::Fatal) => {
                    return Err(anyhow::anyhow!("surface lost and could not be recovered"));
                }
                Err(_) => return Ok(()),
            }

            let drawn = scene
                .on_draw_frame(&mut *fields.backend, Instant::now())
                .context("scene draw failed");

            fields.window.pre_present_notify();
            fields.backend.end_frame();
            drawn
        });

        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }
}

impl<S: Scene> ApplicationHandler for HostState<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the surface's FIFO present mode paces frames.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if let Some(entry) = &self.window {
            let ev = entry.with_window(|w| translate_window_event(w, &event));
            if let Some(ev) = ev {
                self.input_state
                    .apply_event(&mut self.input_frame, ev, Instant::now());
            }
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize(event_loop)
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.shutdown(event_loop);
        }
    }
}

fn build_backend(window: &Window, init: GpuInit) -> Result<WgpuBackend<'_>> {
    let gpu = pollster::block_on(Gpu::new(window, init))
        .context("GPU initialization failed for window")?;
    Ok(WgpuBackend::new(gpu))
}

/// Desktop windows have no rotation; derive it from the aspect ratio.
fn orientation_of(width: u32, height: u32) -> ScreenOrientation {
    if width > height {
        ScreenOrientation::Landscape
    } else {
        ScreenOrientation::Portrait
    }
}
